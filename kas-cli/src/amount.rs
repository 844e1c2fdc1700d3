//! Amount input parsing.
//!
//! Accepts plain decimals ("25000", "12.5") and the Indonesian display form
//! ("Rp 25.000", "1.500,50"): `.` groups thousands and `,` starts decimals.

use anyhow::Result;
use kas_core::ValidationError;
use regex::Regex;

pub fn parse_amount(input: &str) -> Result<f64> {
    let s = input.trim();

    let grouped_re = Regex::new(
        r"^(?i:rp\.?)?\s*(?P<sign>-?)(?P<whole>\d{1,3}(?:\.\d{3})+|\d+)(?:,(?P<frac>\d+))?$",
    )?;
    let plain_re = Regex::new(r"^-?\d+(?:\.\d+)?$")?;

    if let Some(caps) = grouped_re.captures(s) {
        let whole = caps["whole"].replace('.', "");
        let mut normalized = format!("{}{}", &caps["sign"], whole);
        if let Some(frac) = caps.name("frac") {
            normalized.push('.');
            normalized.push_str(frac.as_str());
        }
        return Ok(normalized.parse()?);
    }

    if plain_re.is_match(s) {
        return Ok(s.parse()?);
    }

    Err(ValidationError::NonNumericAmount.into())
}
