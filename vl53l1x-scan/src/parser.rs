use crate::constants::{FIELDS_PER_POINT, FIELD_SEPARATOR, LINE_SUFFIX_SIZE};
use crate::error::ParseError;
use std::str::FromStr;
use vl53l1x_data::{ScanReading, ScanSample};

fn split_fields(raw: &[u8], points: usize) -> Result<Vec<&str>, ParseError> {
    if raw.len() < LINE_SUFFIX_SIZE {
        return Err(ParseError::TooShort(raw.len()));
    }
    let body = &raw[..raw.len() - LINE_SUFFIX_SIZE];
    let text = std::str::from_utf8(body).map_err(|_| ParseError::NotUtf8())?;
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    let expected = FIELDS_PER_POINT * points;
    if fields.len() < expected {
        return Err(ParseError::FieldCount(expected, fields.len()));
    }
    Ok(fields)
}

fn parse_field<T: FromStr>(slot: usize, field: &str) -> Result<T, ParseError> {
    field
        .trim()
        .parse::<T>()
        .map_err(|_| ParseError::InvalidField(slot, field.to_string()))
}

fn slot_indices(points: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..points).map(|slot| (slot, slot * FIELDS_PER_POINT))
}

/// Decodes the ranges of one scan line.
///
/// Only the first field of every `range,sigma,ambient` group is read. A field
/// that is not a non-negative integer is an error, never a zero range.
pub fn parse_scan_line(raw: &[u8], points: usize) -> Result<ScanSample, ParseError> {
    let fields = split_fields(raw, points)?;
    let ranges = slot_indices(points)
        .map(|(slot, i)| parse_field::<u16>(slot, fields[i]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ScanSample { ranges })
}

/// Decodes every field of one scan line.
pub fn parse_scan_readings(raw: &[u8], points: usize) -> Result<Vec<ScanReading>, ParseError> {
    let fields = split_fields(raw, points)?;
    slot_indices(points)
        .map(|(slot, i)| -> Result<ScanReading, ParseError> {
            Ok(ScanReading {
                range: parse_field(slot, fields[i])?,
                sigma: parse_field(slot, fields[i + 1])?,
                ambient: parse_field(slot, fields[i + 2])?,
            })
        })
        .collect()
}
