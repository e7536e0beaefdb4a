use crate::ellipsoid::Ellipsoid;
use crate::error::{Error, Result};
use crate::geodetic;
use crate::util::BoundedAngle;
use crate::utm::{self, Hemisphere, UniversalTransverseMercator};
use uom::si::f64::{Angle, Length};
use uom::si::{angle::degree, length::meter};
use uom::ConstZero;

/// Latitude bands of 8° each from 80°S, with X stretched to 84°N.
const BANDS: &str = "CDEFGHJKLMNPQRSTUVWX";

/// 100km column letters, indexed by `zone % 3`.
const COLUMNS: [&str; 3] = ["STUVWXYZ", "ABCDEFGH", "JKLMNPQR"];

/// 100km row letters. Even zones start five letters in.
const ROWS: &str = "ABCDEFGHJKLMNPQRSTUV";

const SQUARE: f64 = 100_000.;

/// Row letters repeat every 2,000 km of northing.
const ROW_CYCLE: f64 = 20. * SQUARE;

/// Encodes and decodes [Military Grid Reference System] strings such as `17TLG3436151711`.
///
/// A reference is the UTM zone, the latitude band letter, two letters naming a 100 km square
/// within the zone, and an even number of digits giving the easting and northing within that
/// square, truncated to 10^(5 - precision) meters.
///
/// [Military Grid Reference System]: https://en.wikipedia.org/wiki/Military_Grid_Reference_System
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mgrs {
    utm: UniversalTransverseMercator,
}

impl Mgrs {
    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            utm: UniversalTransverseMercator::new(ellipsoid),
        }
    }

    /// The letter of the latitude band containing `latitude`.
    ///
    /// MGRS is only defined between 80°S and 84°N. Outside of that range this returns
    /// [`Error::LatitudeOutOfRange`].
    pub fn latitude_band(latitude: impl Into<Angle>) -> Result<char> {
        let latitude = BoundedAngle::new(latitude).signed().get::<degree>();
        if !(-80.0..=84.0).contains(&latitude) {
            return Err(Error::LatitudeOutOfRange(latitude));
        }
        // 84°N lands on index 20, which is still band X
        let index = (((latitude + 80.) / 8.).floor() as usize).min(BANDS.len() - 1);
        Ok(char::from(BANDS.as_bytes()[index]))
    }

    /// Encodes `point` with `precision` digits each for easting and northing.
    ///
    /// A precision of 5 resolves 1 m, a precision of 1 resolves 10 km. Returns
    /// [`Error::InvalidPrecision`] for a precision outside of `1..=5`.
    pub fn from_geodetic(&self, point: &geodetic::Point, precision: usize) -> Result<String> {
        if !(1..=5).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }
        let band = Self::latitude_band(point.latitude())?;
        let utm = self.utm.from_geodetic(point);
        let zone = utm.zone();
        let easting = utm.easting().get::<meter>();
        let northing = utm.northing().get::<meter>();

        // columns start at 100km, so easting square 0 has no letter
        let square = (easting / SQUARE).floor();
        let column = if square >= 1. {
            column_letters(zone).as_bytes().get(square as usize - 1)
        } else {
            None
        };
        let column = column.map(|&letter| char::from(letter)).ok_or_else(|| {
            Error::InvalidMgrs {
                input: utm.to_string(),
                reason: "easting is outside of the 100km column letters",
            }
        })?;
        let row_index = ((northing / SQUARE).floor() as usize + row_offset(zone)) % ROWS.len();
        let row = char::from(ROWS.as_bytes()[row_index]);

        let divisor = 10_u64.pow(5 - precision as u32);
        let mut mgrs = format!("{zone}{band}{column}{row}");
        mgrs.push_str(&format(easting.floor() as u64 / divisor, precision));
        mgrs.push_str(&format(northing.floor() as u64 / divisor, precision));
        Ok(mgrs)
    }

    /// Decodes an MGRS string into the geodetic position of the south-west corner of the
    /// square it names.
    ///
    /// Letters may be in either case and whitespace anywhere is ignored, so `17T LG 34361 51711`
    /// is accepted. Anywhere from zero to five digits are accepted for each of easting and
    /// northing.
    pub fn to_geodetic(&self, mgrs: &str) -> Result<geodetic::Point> {
        let reference = GridReference::parse(mgrs)?;
        let zone = reference.zone;

        let easting = (reference.column + 1) as f64 * SQUARE + reference.easting;
        let row = (reference.row + ROWS.len() - row_offset(zone)) % ROWS.len();
        let mut northing = row as f64 * SQUARE + reference.northing;

        // the row letters only give northing modulo 2,000 km. pick the cycle that puts us inside
        // the band, allowing for squares that straddle its southern edge.
        let min_northing = self.band_min_northing(zone, reference.band)?;
        let deficit = (min_northing - SQUARE) - northing;
        if deficit > 0. {
            northing += (deficit / ROW_CYCLE).ceil() * ROW_CYCLE;
        }

        let hemisphere = if char::from(BANDS.as_bytes()[reference.band]) >= 'N' {
            Hemisphere::North
        } else {
            Hemisphere::South
        };
        let utm = utm::Point::new(
            zone,
            hemisphere,
            Length::new::<meter>(easting),
            Length::new::<meter>(northing),
        )?;
        self.utm.to_geodetic(&utm)
    }

    /// The lowest northing anywhere on the southern edge of `band` within `zone`.
    fn band_min_northing(&self, zone: u8, band: usize) -> Result<f64> {
        let south_edge = Angle::new::<degree>(-80. + 8. * band as f64);
        let central_meridian = UniversalTransverseMercator::central_meridian(zone)?;
        let northing_at = |longitude: Angle| -> Result<f64> {
            let point = geodetic::Point::new(south_edge, longitude, Length::ZERO);
            let projected = self.utm.from_geodetic_in_zone(&point, zone)?;
            Ok(projected.northing().get::<meter>())
        };
        // northings grow away from the central meridian north of the equator and shrink south
        // of it, so the minimum is at one of the two
        let center = northing_at(central_meridian)?;
        let edge = northing_at(central_meridian + Angle::new::<degree>(3.))?;
        Ok(center.min(edge))
    }
}

/// Formats `value` as exactly `digits` decimal digits.
///
/// Shorter values are padded with leading zeros, and longer values keep only their `digits`
/// least significant digits.
///
/// ```
/// use geomath::mgrs::format;
/// assert_eq!(format(44, 4), "0044");
/// assert_eq!(format(4032, 2), "32");
/// ```
#[must_use]
pub fn format(value: u64, digits: usize) -> String {
    let value = u32::try_from(digits)
        .ok()
        .and_then(|digits| 10_u64.checked_pow(digits))
        .map_or(value, |modulus| value % modulus);
    format!("{value:0digits$}")
}

fn column_letters(zone: u8) -> &'static str {
    COLUMNS[usize::from(zone % 3)]
}

fn row_offset(zone: u8) -> usize {
    if zone % 2 == 0 {
        5
    } else {
        0
    }
}

/// The fields of an MGRS string, validated but not yet resolved to a position.
#[derive(Debug, PartialEq)]
struct GridReference {
    zone: u8,
    band: usize,
    column: usize,
    row: usize,
    // meters into the 100km square
    easting: f64,
    northing: f64,
}

impl GridReference {
    fn parse(input: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidMgrs {
            input: input.to_owned(),
            reason,
        };
        let cleaned: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let zone_digits = cleaned.bytes().take_while(u8::is_ascii_digit).count();
        if zone_digits == 0 {
            return Err(invalid("missing zone number"));
        }
        if zone_digits > 2 {
            return Err(invalid("zone number has more than two digits"));
        }
        let (zone, rest) = cleaned.split_at(zone_digits);
        let zone: u8 = zone
            .parse()
            .map_err(|_| invalid("zone number is not a number"))?;
        if !(1..=60).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }

        let mut letters = rest.chars();
        let band = letters
            .next()
            .ok_or_else(|| invalid("missing latitude band letter"))?;
        let band = BANDS
            .find(band)
            .ok_or_else(|| invalid("unknown latitude band letter"))?;
        let column = letters
            .next()
            .ok_or_else(|| invalid("missing 100km square column letter"))?;
        let column = column_letters(zone)
            .find(column)
            .ok_or_else(|| invalid("100km square column letter is not used in this zone"))?;
        let row = letters
            .next()
            .ok_or_else(|| invalid("missing 100km square row letter"))?;
        let row = ROWS
            .find(row)
            .ok_or_else(|| invalid("unknown 100km square row letter"))?;

        let digits = letters.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("easting and northing must be digits"));
        }
        if digits.len() % 2 != 0 || digits.len() > 10 {
            return Err(invalid(
                "easting and northing must have the same number of digits, at most five each",
            ));
        }
        let precision = digits.len() / 2;
        let (easting, northing) = digits.split_at(precision);
        let scale = 10_f64.powi(5 - precision as i32);
        let meters = |digits: &str| -> Result<f64> {
            if digits.is_empty() {
                return Ok(0.);
            }
            let value: u32 = digits
                .parse()
                .map_err(|_| invalid("easting and northing must be digits"))?;
            Ok(f64::from(value) * scale)
        };

        Ok(Self {
            zone,
            band,
            column,
            row,
            easting: meters(easting)?,
            northing: meters(northing)?,
        })
    }
}
