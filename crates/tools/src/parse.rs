use foundation::{GeoBounds, LngLat};

fn floats(raw: &str, n: usize, what: &str) -> Result<Vec<f64>, String> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid {what} `{raw}`: {e}"))?;
    if parts.len() != n {
        return Err(format!("{what} needs {n} comma-separated numbers, got `{raw}`"));
    }
    Ok(parts)
}

/// `lng,lat`
pub fn parse_lng_lat(raw: &str) -> Result<LngLat, String> {
    let v = floats(raw, 2, "position")?;
    Ok(LngLat::new(v[0], v[1]))
}

/// `west,south,east,north`
pub fn parse_bbox(raw: &str) -> Result<GeoBounds, String> {
    let v = floats(raw, 4, "bbox")?;
    let (west, south, east, north) = (v[0], v[1], v[2], v[3]);
    if south > north || west > east {
        return Err(format!("bbox edges out of order: `{raw}`"));
    }
    Ok(GeoBounds::new(north, south, east, west))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions_and_boxes() {
        assert_eq!(parse_lng_lat("32.85, 39.84").unwrap(), LngLat::new(32.85, 39.84));
        let b = parse_bbox("32.84,39.83,32.87,39.86").unwrap();
        assert_eq!(b, GeoBounds::new(39.86, 39.83, 32.87, 32.84));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_lng_lat("32.85").is_err());
        assert!(parse_lng_lat("a,b").is_err());
        assert!(parse_bbox("32.87,39.83,32.84,39.86").is_err());
    }
}
