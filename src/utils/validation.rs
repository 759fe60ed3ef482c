use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_cell_size(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Cell size must be a positive number of pixels".to_string(),
        });
    }
    Ok(())
}

pub fn validate_date_range(field_name: &str, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}..{}", start, end),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.base_url", "https://sudokupad.app/nyt").is_ok());
        assert!(validate_url("source.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("source.base_url", "").is_err());
        assert!(validate_url("source.base_url", "sudokupad.app").is_err());
        assert!(validate_url("source.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.path", "puzzles.json").is_ok());
        assert!(validate_path("output.path", "").is_err());
        assert!(validate_path("output.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_cell_size() {
        assert!(validate_cell_size("grid.cell_size_px", 64.0).is_ok());
        assert!(validate_cell_size("grid.cell_size_px", 0.0).is_err());
        assert!(validate_cell_size("grid.cell_size_px", -64.0).is_err());
        assert!(validate_cell_size("grid.cell_size_px", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert!(validate_date_range("sweep", start, end).is_ok());
        assert!(validate_date_range("sweep", start, start).is_ok());
        assert!(validate_date_range("sweep", end, start).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3);
        let missing: Option<i32> = None;
        assert_eq!(*validate_required_field("x", &present).unwrap(), 3);
        assert!(matches!(
            validate_required_field("sweep.start_date", &missing),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("renderer.timeout_seconds", 10, 1).is_ok());
        assert!(validate_positive_number("renderer.timeout_seconds", 0, 1).is_err());
    }
}
