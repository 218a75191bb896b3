use rust_decimal::Decimal;

/// Format an amount with thousands separators and its currency: -1,234.56 ₽, $42.10
pub fn money(amount: Decimal, currency: &str) -> String {
    let negative = amount.is_sign_negative() && !amount.round_dp(2).is_zero();
    let cents = format!("{:.2}", amount.abs().round_dp(2));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();
    let sign = if negative { "-" } else { "" };

    match currency {
        "USD" => format!("{sign}${with_commas}.{dec_part}"),
        "EUR" => format!("{sign}€{with_commas}.{dec_part}"),
        "RUB" => format!("{sign}{with_commas}.{dec_part} ₽"),
        other => format!("{sign}{with_commas}.{dec_part} {other}"),
    }
}
