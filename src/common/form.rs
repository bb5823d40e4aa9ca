// src/common/form.rs

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer};

/// Formulários HTML mandam "" para campos em branco; trata isso como ausente.
pub fn blank_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Igual a `blank_as_none`, mas faz o parse com `FromStr` (ids de `<select>`).
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match blank_as_none(de)? {
        None => Ok(None),
        Some(s) => T::from_str(&s).map(Some).map_err(de::Error::custom),
    }
}

/// Valor monetário digitado no formato brasileiro ("1.234,56") ou com ponto
/// decimal ("1234.56"). NaN e infinito são recusados.
pub fn parse_decimal(texto: &str) -> Result<f64, String> {
    let normalizado = if texto.contains(',') {
        texto.replace('.', "").replace(',', ".")
    } else {
        texto.to_string()
    };
    match normalizado.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("valor numérico inválido: {}", texto)),
    }
}

pub fn decimal_or_none<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(de)? {
        None => Ok(None),
        Some(s) => parse_decimal(&s).map(Some).map_err(de::Error::custom),
    }
}

/// Número obrigatório vindo de formulário; em branco vale zero.
pub fn number_or_zero<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(decimal_or_none(de)?.unwrap_or(0.0))
}

/// Checkbox HTML: presente ("on") quando marcado, ausente caso contrário.
pub fn checkbox<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(matches!(opt.as_deref(), Some("on" | "true" | "1")))
}

/// Datas chegam como AAAA-MM-DD; valida antes de gravar como texto.
pub fn validate_date(value: &str) -> Result<(), validator::ValidationError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            let mut err = validator::ValidationError::new("date");
            err.message = Some("Data inválida (use AAAA-MM-DD).".into());
            err
        })
}

pub fn validate_not_negative(val: f64) -> Result<(), validator::ValidationError> {
    if val < 0.0 {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "decimal_or_none")]
        valor: Option<f64>,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        cliente_id: Option<i64>,
        #[serde(default, deserialize_with = "checkbox")]
        empreitada: bool,
        #[serde(default, deserialize_with = "blank_as_none")]
        endereco: Option<String>,
    }

    fn parse(body: &str) -> Form {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn blank_inputs_become_none() {
        let form = parse(r#"{"valor": "", "cliente_id": "  "}"#);
        assert_eq!(form.valor, None);
        assert_eq!(form.cliente_id, None);
        assert!(!form.empreitada);
    }

    #[test]
    fn decimal_comma_is_accepted() {
        let form = parse(r#"{"valor": "150,50", "cliente_id": "3", "empreitada": "on"}"#);
        assert_eq!(form.valor, Some(150.5));
        assert_eq!(form.cliente_id, Some(3));
        assert!(form.empreitada);
    }

    #[test]
    fn text_keeps_commas() {
        let form = parse(r#"{"endereco": " Rua A, 10 "}"#);
        assert_eq!(form.endereco.as_deref(), Some("Rua A, 10"));
    }

    #[test]
    fn dates_must_be_iso() {
        assert!(validate_date("2024-02-29").is_ok());
        assert!(validate_date("29/02/2024").is_err());
    }

    #[test]
    fn brazilian_thousands_separator_is_accepted() {
        assert_eq!(parse_decimal("1.234,56"), Ok(1234.56));
        assert_eq!(parse_decimal("1.000.000,00"), Ok(1_000_000.0));
        assert_eq!(parse_decimal("1234.5"), Ok(1234.5));
        assert_eq!(parse_decimal("80"), Ok(80.0));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for texto in ["NaN", "nan", "inf", "-inf", "infinity", "1e400", "abc"] {
            assert!(parse_decimal(texto).is_err(), "{} deveria ser recusado", texto);
        }
        assert!(serde_json::from_str::<Form>(r#"{"valor": "NaN"}"#).is_err());
    }

    #[test]
    fn negative_values_fail_validation() {
        assert!(validate_not_negative(-0.01).is_err());
        assert!(validate_not_negative(0.0).is_ok());
    }
}
