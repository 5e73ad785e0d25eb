//! Tolerant parser for free-form "latitude longitude" expressions.
//!
//! Accepts the formats people type into spreadsheets: signed decimal degrees,
//! hemisphere letters before or after each value, and degree/minute/second
//! notation either with `°`, `'` and `"` markers, colon-separated or as plain
//! number groups.

use thiserror::Error;

use crate::models::CoordinatePair;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("missing or non-string '{0}' property")]
    MissingField(&'static str),
    #[error("coordinate expression is empty")]
    Empty,
    #[error("unexpected character '{0}' in coordinate expression")]
    UnexpectedCharacter(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unit marker '{0}' does not follow a number")]
    DanglingUnit(char),
    #[error("expected a latitude and a longitude, found {0} components")]
    ComponentCount(usize),
    #[error("cannot split {0} values into a latitude and a longitude")]
    UnpairedValues(usize),
    #[error("a component needs 1 to 3 numbers, found {0}")]
    ComponentArity(usize),
    #[error("{0} marker is out of degree/minute/second order")]
    UnitOrder(&'static str),
    #[error("degrees must be whole when minutes follow, got {0}")]
    FractionalDegrees(f64),
    #[error("{0} must be in [0, 60), got {1}")]
    SubdivisionRange(&'static str, f64),
    #[error("sign and hemisphere letter given together")]
    SignWithHemisphere,
    #[error("both components refer to the same axis")]
    ConflictingHemispheres,
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeRange(f64),
}

/// A validated geographic position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn parse(expr: &str) -> Result<GeoPoint, CoordinateError> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(CoordinateError::Empty);
        }

        let components = group_components(tokens)?;
        if components.len() != 2 {
            return Err(CoordinateError::ComponentCount(components.len()));
        }

        let first_axis = match (
            components[0].hemisphere.map(Hemisphere::axis),
            components[1].hemisphere.map(Hemisphere::axis),
        ) {
            (Some(a), Some(b)) if a == b => return Err(CoordinateError::ConflictingHemispheres),
            (Some(a), _) => a,
            (None, Some(b)) => b.other(),
            (None, None) => Axis::Latitude,
        };

        let first = components[0].decimal_degrees()?;
        let second = components[1].decimal_degrees()?;
        let (latitude, longitude) = match first_axis {
            Axis::Latitude => (first, second),
            Axis::Longitude => (second, first),
        };

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeRange(longitude));
        }

        Ok(GeoPoint { latitude, longitude })
    }

    /// Rendering order: longitude first.
    pub fn to_pair(self) -> CoordinatePair {
        CoordinatePair::new(self.longitude, self.latitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn other(self) -> Axis {
        match self {
            Axis::Latitude => Axis::Longitude,
            Axis::Longitude => Axis::Latitude,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn from_char(c: char) -> Option<Hemisphere> {
        match c.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    Degrees,
    Minutes,
    Seconds,
}

impl Unit {
    fn from_char(c: char) -> Option<Unit> {
        match c {
            '°' | 'º' | '˚' => Some(Unit::Degrees),
            '\'' | '′' | '’' | '´' => Some(Unit::Minutes),
            '"' | '″' | '”' => Some(Unit::Seconds),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Unit::Degrees => "degrees",
            Unit::Minutes => "minutes",
            Unit::Seconds => "seconds",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Number {
    value: f64,
    signed: bool,
    unit: Option<Unit>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(Number),
    Hemisphere(Hemisphere),
}

fn tokenize(expr: &str) -> Result<Vec<Token>, CoordinateError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        // ':' separates the parts of "40:7:22.8"
        if c.is_whitespace() || c == ',' || c == ';' || c == ':' {
            chars.next();
            continue;
        }

        if let Some(unit) = Unit::from_char(c) {
            chars.next();
            match tokens.last_mut() {
                Some(Token::Number(number)) if number.unit.is_none() => number.unit = Some(unit),
                _ => return Err(CoordinateError::DanglingUnit(c)),
            }
            continue;
        }

        if let Some(hemisphere) = Hemisphere::from_char(c) {
            chars.next();
            tokens.push(Token::Hemisphere(hemisphere));
            continue;
        }

        if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' {
            let mut text = String::new();
            text.push(c);
            chars.next();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_digit() || next == '.' {
                    text.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = text
                .parse()
                .map_err(|_| CoordinateError::InvalidNumber(text.clone()))?;
            if !value.is_finite() {
                return Err(CoordinateError::InvalidNumber(text));
            }
            tokens.push(Token::Number(Number {
                value,
                signed: text.starts_with('-') || text.starts_with('+'),
                unit: None,
            }));
            continue;
        }

        return Err(CoordinateError::UnexpectedCharacter(c));
    }

    Ok(tokens)
}

#[derive(Debug, Default)]
struct Component {
    numbers: Vec<Number>,
    hemisphere: Option<Hemisphere>,
}

impl Component {
    fn decimal_degrees(&self) -> Result<f64, CoordinateError> {
        if self.numbers.is_empty() || self.numbers.len() > 3 {
            return Err(CoordinateError::ComponentArity(self.numbers.len()));
        }

        let positions = [Unit::Degrees, Unit::Minutes, Unit::Seconds];
        for (number, expected) in self.numbers.iter().zip(positions) {
            if let Some(unit) = number.unit {
                if unit != expected {
                    return Err(CoordinateError::UnitOrder(unit.name()));
                }
            }
        }

        let degrees = self.numbers[0];
        let mut magnitude = degrees.value.abs();
        if self.numbers.len() > 1 && magnitude.fract() != 0.0 {
            return Err(CoordinateError::FractionalDegrees(degrees.value));
        }

        for (number, (unit, divisor)) in self.numbers[1..]
            .iter()
            .zip([(Unit::Minutes, 60.0), (Unit::Seconds, 3600.0)])
        {
            if number.signed || !(0.0..60.0).contains(&number.value) {
                return Err(CoordinateError::SubdivisionRange(unit.name(), number.value));
            }
            magnitude += number.value / divisor;
        }

        let negative = degrees.value.is_sign_negative();
        match self.hemisphere {
            Some(_) if degrees.signed => Err(CoordinateError::SignWithHemisphere),
            Some(hemisphere) if hemisphere.is_negative() => Ok(-magnitude),
            Some(_) => Ok(magnitude),
            None if negative => Ok(-magnitude),
            None => Ok(magnitude),
        }
    }
}

fn group_components(tokens: Vec<Token>) -> Result<Vec<Component>, CoordinateError> {
    let has_hemisphere = tokens.iter().any(|t| matches!(t, Token::Hemisphere(_)));
    let has_degree_marker = tokens
        .iter()
        .any(|t| matches!(t, Token::Number(n) if n.unit == Some(Unit::Degrees)));

    if has_hemisphere {
        group_by_hemisphere(tokens)
    } else if has_degree_marker {
        let mut components: Vec<Component> = Vec::new();
        for token in tokens {
            if let Token::Number(number) = token {
                let starts_new = number.unit == Some(Unit::Degrees) || components.is_empty();
                if starts_new {
                    components.push(Component::default());
                }
                if let Some(current) = components.last_mut() {
                    current.numbers.push(number);
                }
            }
        }
        Ok(components)
    } else {
        let numbers: Vec<Number> = tokens
            .into_iter()
            .filter_map(|t| match t {
                Token::Number(n) => Some(n),
                Token::Hemisphere(_) => None,
            })
            .collect();
        if numbers.len() % 2 != 0 {
            return Err(CoordinateError::UnpairedValues(numbers.len()));
        }
        let half = numbers.len() / 2;
        Ok(vec![
            Component {
                numbers: numbers[..half].to_vec(),
                hemisphere: None,
            },
            Component {
                numbers: numbers[half..].to_vec(),
                hemisphere: None,
            },
        ])
    }
}

// Letters lead each value ("N 33 W 84") or trail it ("33N 84W")
fn group_by_hemisphere(tokens: Vec<Token>) -> Result<Vec<Component>, CoordinateError> {
    let prefix = matches!(tokens.first(), Some(Token::Hemisphere(_)));
    let mut components = Vec::new();
    let mut current = Component::default();

    for token in tokens {
        match (token, prefix) {
            (Token::Hemisphere(h), true) => {
                if current.hemisphere.is_some() {
                    components.push(std::mem::take(&mut current));
                }
                current.hemisphere = Some(h);
            }
            (Token::Hemisphere(h), false) => {
                current.hemisphere = Some(h);
                components.push(std::mem::take(&mut current));
            }
            (Token::Number(n), _) => current.numbers.push(n),
        }
    }

    if current.hemisphere.is_some() || !current.numbers.is_empty() {
        components.push(current);
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_signed_decimal_degrees() {
        let point = GeoPoint::parse("33.7490 -84.3880").unwrap();
        assert!(close(point.latitude, 33.749));
        assert!(close(point.longitude, -84.388));
    }

    #[test]
    fn test_comma_separated_pair() {
        let point = GeoPoint::parse("33.7490, -84.3880").unwrap();
        assert!(close(point.latitude, 33.749));
        assert!(close(point.longitude, -84.388));
    }

    #[test]
    fn test_hemisphere_suffix_and_prefix() {
        let suffix = GeoPoint::parse("33.749N 84.388W").unwrap();
        let prefix = GeoPoint::parse("N 33.749 W 84.388").unwrap();
        assert_eq!(suffix, prefix);
        assert!(close(suffix.longitude, -84.388));
    }

    #[test]
    fn test_longitude_first_with_letters_is_swapped() {
        let point = GeoPoint::parse("84.388W 33.749N").unwrap();
        assert!(close(point.latitude, 33.749));
        assert!(close(point.longitude, -84.388));
    }

    #[test]
    fn test_dms_with_markers() {
        let point = GeoPoint::parse("33°44'56.4\"N 84°23'16.8\"W").unwrap();
        assert!(close(point.latitude, 33.749));
        assert!(close(point.longitude, -84.388));
    }

    #[test]
    fn test_dms_plain_groups() {
        let point = GeoPoint::parse("33 44 56.4 -84 23 16.8").unwrap();
        assert!(close(point.latitude, 33.749));
        assert!(close(point.longitude, -84.388));
    }

    #[test]
    fn test_acute_accent_minutes() {
        let point = GeoPoint::parse("40° 7´ 22.8\" N 74° 7´ 22.8\" W").unwrap();
        assert!(close(point.latitude, 40.123));
        assert!(close(point.longitude, -74.123));
    }

    #[test]
    fn test_colon_separated_dms() {
        let lettered = GeoPoint::parse("40:7:22.8N 74:7:22.8W").unwrap();
        assert!(close(lettered.latitude, 40.123));
        assert!(close(lettered.longitude, -74.123));

        let signed = GeoPoint::parse("40:7:22.8 -74:7:22.8").unwrap();
        assert_eq!(signed, lettered);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(GeoPoint::parse("   "), Err(CoordinateError::Empty));
        assert_eq!(
            GeoPoint::parse("33.7 abc"),
            Err(CoordinateError::UnexpectedCharacter('a'))
        );
        assert_eq!(
            GeoPoint::parse(" -84.388"),
            Err(CoordinateError::UnpairedValues(1))
        );
        assert!(matches!(
            GeoPoint::parse("1.2.3 4"),
            Err(CoordinateError::InvalidNumber(_))
        ));
        assert_eq!(
            GeoPoint::parse("33 N 84 S"),
            Err(CoordinateError::ConflictingHemispheres)
        );
        assert_eq!(
            GeoPoint::parse("-33 N 84 W"),
            Err(CoordinateError::SignWithHemisphere)
        );
        assert!(matches!(
            GeoPoint::parse("33 75 84 10"),
            Err(CoordinateError::SubdivisionRange("minutes", _))
        ));
    }

    #[test]
    fn test_range_validation() {
        assert_eq!(
            GeoPoint::parse("91 10"),
            Err(CoordinateError::LatitudeRange(91.0))
        );
        assert_eq!(
            GeoPoint::parse("10 -181"),
            Err(CoordinateError::LongitudeRange(-181.0))
        );
        assert!(GeoPoint::parse("-90 180").is_ok());
    }

    #[test]
    fn test_to_pair_is_longitude_first() {
        let pair = GeoPoint::parse("33.749 -84.388").unwrap().to_pair();
        assert!(close(pair.longitude(), -84.388));
        assert!(close(pair.latitude(), 33.749));
    }
}
