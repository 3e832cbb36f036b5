use crate::error::SheetDocError;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Value;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use iso8601_duration::Duration as IsoDuration;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Day zero of a workbook's serial dates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum Epoch {
    /// Serial 1 is 1900-01-01, with the phantom 1900-02-29 of Lotus 1-2-3
    #[default]
    Y1900,
    /// Serial 0 is 1904-01-01
    Y1904,
}

impl Epoch {
    fn origin(self, serial_days: f64) -> Option<NaiveDateTime> {
        let origin = match self {
            // serials below 60 precede the phantom leap day
            Epoch::Y1900 if serial_days < 60.0 => NaiveDate::from_ymd_opt(1899, 12, 31),
            Epoch::Y1900 => NaiveDate::from_ymd_opt(1899, 12, 30),
            Epoch::Y1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
        };
        origin.and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

/// What a numeric serial stands for, decided by the cell's number format.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Serial {
    Date,
    Time,
    DateTime,
}

impl Serial {
    /// Built-in format ids with a date or time meaning.
    pub(crate) fn from_builtin_format(id: u32) -> Option<Serial> {
        match id {
            14..=17 => Some(Serial::Date),
            18..=21 | 45..=47 => Some(Serial::Time),
            22 => Some(Serial::DateTime),
            _ => None,
        }
    }

    /// Scans a custom format code for date and time tokens. Quoted literals,
    /// bracketed sections and escaped characters are ignored.
    pub(crate) fn from_format_code(code: &str) -> Option<Serial> {
        let mut has_date = false;
        let mut has_time = false;
        let mut chars = code.chars();
        while let Some(character) = chars.next() {
            match character {
                '\\' | '_' | '*' => {
                    chars.next();
                }
                '"' => {
                    for quoted in chars.by_ref() {
                        if quoted == '"' {
                            break;
                        }
                    }
                }
                '[' => {
                    for bracketed in chars.by_ref() {
                        if bracketed == ']' {
                            break;
                        }
                    }
                }
                'y' | 'Y' | 'd' | 'D' => has_date = true,
                'h' | 'H' | 's' | 'S' => has_time = true,
                _ => (),
            }
        }
        match (has_date, has_time) {
            (true, true) => Some(Serial::DateTime),
            (true, false) => Some(Serial::Date),
            (false, true) => Some(Serial::Time),
            (false, false) => None,
        }
    }

    fn render(self, raw: &str, epoch: Epoch) -> Result<String, SheetDocError> {
        let serial = raw.trim().parse::<f64>()?;
        let millis = (serial * MILLIS_PER_DAY).round() as i64;
        if self == Serial::Time {
            return Ok(clock(millis));
        }
        let moment = epoch
            .origin(serial.trunc())
            .and_then(|origin| origin.checked_add_signed(Duration::milliseconds(millis)))
            .ok_or_else(|| SpreadsheetError::DateOutOfRangeError(raw.to_owned()))?;
        let text = match self {
            Serial::Date => moment.format("%Y-%m-%d").to_string(),
            _ if millis % 1_000 != 0 => moment.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            _ => moment.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        Ok(text)
    }
}

/// Formats a duration in milliseconds as `HH:MM:SS`, hours may exceed 24.
fn clock(millis: i64) -> String {
    let (seconds, fraction) = (millis / 1_000, millis % 1_000);
    let (hours, minutes, seconds) = (seconds / 3_600, seconds / 60 % 60, seconds % 60);
    if fraction > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{fraction:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// How the raw text of a cell is turned into a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellKind {
    Bool,
    Number,
    Serial(Serial, Epoch),
    /// `2024-03-01T10:00:00` style text
    IsoDateTime,
    /// `PT13H05M00S` style text
    IsoDuration,
    Text,
    /// Index into the shared string table
    SharedString,
    /// `#DIV/0!` and friends, kept as text
    Error,
}

impl CellKind {
    /// Number kind for a style: a date/time serial when its format says so.
    pub(crate) fn for_number_format(serial: Option<Serial>, epoch: Epoch) -> CellKind {
        serial.map_or(CellKind::Number, |serial| CellKind::Serial(serial, epoch))
    }

    pub(crate) fn decode(self, raw: &str, shared_strings: &[String]) -> Result<Value, SheetDocError> {
        let value = match self {
            CellKind::Bool => Value::Bool(raw == "1" || raw.eq_ignore_ascii_case("true")),
            CellKind::Number => Value::Number(raw.trim().parse()?),
            CellKind::Serial(serial, epoch) => Value::Text(serial.render(raw, epoch)?),
            CellKind::IsoDateTime => Value::Text(raw.replacen('T', " ", 1)),
            CellKind::IsoDuration => Value::Text(duration_text(raw)),
            CellKind::Text | CellKind::Error => Value::Text(raw.to_owned()),
            CellKind::SharedString => {
                let index = raw.trim().parse::<usize>()?;
                let text = shared_strings.get(index).ok_or(SpreadsheetError::SharedStringError(index))?;
                Value::Text(text.to_owned())
            }
        };
        Ok(value)
    }
}

/// `PT13H05M00S` becomes `13:05:00`; text the parser rejects is kept as is.
fn duration_text(raw: &str) -> String {
    match raw.parse::<IsoDuration>() {
        Ok(duration) => {
            let hours = f64::from(duration.day) * 24.0 + f64::from(duration.hour);
            let seconds = hours * 3_600.0 + f64::from(duration.minute) * 60.0 + f64::from(duration.second);
            clock((seconds * 1_000.0).round() as i64)
        }
        Err(_) => raw.to_owned(),
    }
}
