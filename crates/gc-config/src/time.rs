use crate::ConfigError;

/// Parses `hh[:mm[:ss]]` into a second count. An empty or negative value
/// maps to `-1` ("unset"), matching the original interface's `getTime`.
pub fn parse_time(value: &str) -> Result<i64, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(-1);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(ConfigError::InvalidTime {
            value: value.to_string(),
        });
    }

    let mut fields = [0i64; 3];
    for (slot, part) in fields.iter_mut().zip(parts.iter()) {
        *slot = part
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidTime {
                value: value.to_string(),
            })?;
    }
    let [h, m, s] = fields;
    let seconds = h * 3600 + m * 60 + s;
    if seconds < 0 {
        Ok(-1)
    } else {
        Ok(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_5_time_parser_table() {
        assert_eq!(parse_time("1:30").unwrap(), 5400);
        assert_eq!(parse_time("").unwrap(), -1);
        assert_eq!(parse_time("-5").unwrap(), -1);
        assert_eq!(parse_time("0:0:7").unwrap(), 7);
    }

    #[test]
    fn rejects_too_many_components() {
        assert!(parse_time("1:2:3:4").is_err());
    }

    #[test]
    fn rejects_non_numeric_components() {
        assert!(parse_time("an:hour").is_err());
    }
}
