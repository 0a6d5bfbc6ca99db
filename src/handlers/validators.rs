// src/handlers/validators.rs

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::client::phone_digits;

// ---
// Validações customizadas compartilhadas pelos payloads
// ---

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "O campo não pode ficar em branco."));
    }
    Ok(())
}

// Aceita qualquer máscara, desde que sobrem 10 ou 11 dígitos
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "Telefone é obrigatório."));
    }
    match phone_digits(value).len() {
        10 | 11 => Ok(()),
        _ => Err(invalid("phone", "Telefone deve ter 10 ou 11 dígitos.")),
    }
}

/// Maior valor que cabe em `NUMERIC(10, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

// Valores monetários: (0, MAX_AMOUNT] e no máximo 2 casas decimais
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = invalid("range", "Valor deve ser maior que zero.");
        err.add_param("min".into(), &0.0);
        return Err(err);
    }
    if *value > MAX_AMOUNT {
        let mut err = invalid("range", "Valor deve ser no máximo 99.999.999,99.");
        err.add_param("max".into(), &MAX_AMOUNT.to_string());
        return Err(err);
    }
    if value.normalize().scale() > 2 {
        return Err(invalid("scale", "Valor deve ter no máximo 2 casas decimais."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_needs_ten_or_eleven_digits() {
        assert!(validate_phone("(11) 99999-8888").is_ok());
        assert!(validate_phone("1133334444").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("   ").is_err());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn amounts_fit_the_column() {
        assert_eq!(MAX_AMOUNT, Decimal::new(9_999_999_999, 2));
        assert!(validate_positive(&MAX_AMOUNT).is_ok());
        assert!(validate_positive(&Decimal::new(10_000_000_000, 2)).is_err());
        assert!(validate_positive(&Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0)).is_err());
    }

    #[test]
    fn amounts_have_at_most_two_decimals() {
        assert!(validate_positive(&Decimal::new(1001, 2)).is_ok());
        // zeros à direita não contam
        assert!(validate_positive(&Decimal::new(10_500, 3)).is_ok());
        assert!(validate_positive(&Decimal::new(10_005, 3)).is_err());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("Maria").is_ok());
        assert!(validate_not_blank(" \t").is_err());
    }
}
