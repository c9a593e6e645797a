// ============================================================================
// Formatage des nombres et des prix
// ============================================================================
// Fonctions pures utilisées par les cartes, la fenêtre de détail, les
// étiquettes de l'axe des prix et les infobulles du graphique
// ============================================================================

/// Formate un volume avec une unité abrégée
///
/// - >= 1e12 : "1.23조"
/// - >= 1e9  : "1.23억"
/// - >= 1e6  : "1.2M"
/// - >= 1e3  : "1.2K"
/// - sinon  : entier groupé par milliers
///
/// Un volume absent, nul ou NaN s'affiche "-".
pub fn format_number(value: Option<f64>) -> String {
    let num = match value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => return "-".to_string(),
    };

    if num >= 1_000_000_000_000.0 {
        format!("{:.2}조", num / 1_000_000_000_000.0)
    } else if num >= 1_000_000_000.0 {
        format!("{:.2}억", num / 1_000_000_000.0)
    } else if num >= 1_000_000.0 {
        format!("{:.1}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        group_thousands(num)
    }
}

/// Formate un prix en wons : "71,300원"
pub fn format_price(price: f64) -> String {
    format!("{}원", group_thousands(price))
}

/// Formate une variation : "+1,200 (+1.71%)"
pub fn format_change(change: f64, change_percent: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    let percent_sign = if change_percent >= 0.0 { "+" } else { "" };
    format!(
        "{}{} ({}{:.2}%)",
        sign,
        group_thousands(change.round()),
        percent_sign,
        change_percent
    )
}

/// Formate une date de news "YYYYMMDDHHmm" en "YYYY.MM.DD HH:mm"
///
/// Une chaîne trop courte est tronquée proprement plutôt que de paniquer.
pub fn format_news_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // CONCEPT RUST : get() sur une slice de &str
    // - Retourne None au lieu de paniquer si l'index dépasse
    let part = |start: usize, end: usize| raw.get(start..end.min(raw.len())).unwrap_or("");

    format!(
        "{}.{}.{} {}:{}",
        part(0, 4),
        part(4, 6),
        part(6, 8),
        part(8, 10),
        part(10, 12)
    )
}

/// Groupe la partie entière par milliers, avec au plus 2 décimales
fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let abs = value.abs();

    // Arrondi au centième, comme toLocaleString
    let rounded = (abs * 100.0).round() / 100.0;
    let integer = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if cents > 0 {
        let decimals = format!("{:02}", cents);
        grouped.push('.');
        grouped.push_str(decimals.trim_end_matches('0'));
    }

    if negative && (integer > 0 || cents > 0) {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_units() {
        assert_eq!(format_number(None), "-");
        assert_eq!(format_number(Some(0.0)), "-");
        assert_eq!(format_number(Some(f64::NAN)), "-");
        assert_eq!(format_number(Some(950.0)), "950");
        assert_eq!(format_number(Some(12_345.0)), "12.3K");
        assert_eq!(format_number(Some(15_300_000.0)), "15.3M");
        assert_eq!(format_number(Some(2_500_000_000.0)), "2.50억");
        assert_eq!(format_number(Some(3_000_000_000_000.0)), "3.00조");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(71300.0), "71,300원");
        assert_eq!(format_price(1234567.5), "1,234,567.5원");
        assert_eq!(format_price(999.0), "999원");
        assert_eq!(format_price(-1500.0), "-1,500원");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(1200.0, 1.7142), "+1,200 (+1.71%)");
        assert_eq!(format_change(-500.0, -0.5), "-500 (-0.50%)");
    }

    #[test]
    fn test_format_news_date() {
        assert_eq!(format_news_date("202401151430"), "2024.01.15 14:30");
        assert_eq!(format_news_date(""), "");
        assert_eq!(format_news_date("20240115"), "2024.01.15 :");
    }
}
