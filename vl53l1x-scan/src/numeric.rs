pub(crate) fn degree_to_radian(degree: f64) -> f64 {
    degree * std::f64::consts::PI / 180.
}

/// Projects a radial range onto the axis perpendicular to the scan plane.
pub(crate) fn perpendicular_distance(range: u16, angle_degree: f64, offset: i32) -> f64 {
    (range as f64) * f64::cos(degree_to_radian(angle_degree)) - (offset as f64)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / (values.len() as f64)
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| match *e {
            0x20..=0x7E => (*e as char).to_string(),
            _ => format!("\\x{:02X}", e),
        })
        .collect::<Vec<_>>()
        .join("")
}
