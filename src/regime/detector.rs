/// Buyer/seller regime detector
///
/// Tracks which side of the raw pressure (`b` vs `s`) dominates and emits a
/// marker on every change of side:
/// - red: seller -> buyer
/// - green: buyer -> seller
///
/// The mode is taken from the first bar (a tie starts as seller). Ties never
/// flip the mode. Two variants share the state machine: one values markers
/// at the smoothed pressure, the other at the close price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::{Marker, RegimeMarkers};
use crate::pipeline::{Column, SeriesTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Unset,
    Buyer,
    Seller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeFlip {
    ToBuyer,
    ToSeller,
}

impl Mode {
    /// Feed one bar's pressure; returns the flip it caused, if any
    pub fn observe(&mut self, buyer: f64, seller: f64) -> Option<RegimeFlip> {
        if *self == Mode::Unset {
            *self = if buyer > seller {
                Mode::Buyer
            } else {
                Mode::Seller
            };
        }

        if buyer > seller && *self == Mode::Seller {
            *self = Mode::Buyer;
            return Some(RegimeFlip::ToBuyer);
        }
        if seller > buyer && *self == Mode::Buyer {
            *self = Mode::Seller;
            return Some(RegimeFlip::ToSeller);
        }
        None
    }
}

/// Divergence angle between buyer and seller EMA since the last flip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSample {
    pub timestamp: DateTime<Utc>,
    pub angle: f64,
}

/// Markers from the EMA variant plus its diagnostic angle series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmaRegimeOutput {
    pub markers: RegimeMarkers,
    pub angles: Vec<AngleSample>,
}

/// Per-bar columns read by the detectors
pub struct RegimeInputs<'a> {
    pub timestamps: &'a [DateTime<Utc>],
    pub buyer: &'a [f64],
    pub seller: &'a [f64],
    pub buyer_ema: &'a [f64],
    pub seller_ema: &'a [f64],
    pub close: &'a [f64],
}

impl RegimeInputs<'_> {
    fn len(&self) -> usize {
        [
            self.timestamps.len(),
            self.buyer.len(),
            self.seller.len(),
            self.buyer_ema.len(),
            self.seller_ema.len(),
            self.close.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

/// Markers valued at the smoothed pressure of the side taking over
///
/// Angles use the total seconds since the last reference bar. A gap of one
/// day or more therefore yields a non-zero elapsed time, unlike a clock that
/// only counts the seconds within a day.
pub fn detect_ema_regimes(inputs: &RegimeInputs<'_>) -> EmaRegimeOutput {
    let mut output = EmaRegimeOutput::default();
    let mut mode = Mode::Unset;

    let mut ref_time = None;
    let mut ref_y = -1.0;
    let mut b_y = -1.0;
    let mut s_y = -1.0;

    for i in 0..inputs.len() {
        let timestamp = inputs.timestamps[i];
        let (b, s) = (inputs.buyer[i], inputs.seller[i]);
        let (b_ema, s_ema) = (inputs.buyer_ema[i], inputs.seller_ema[i]);

        if mode == Mode::Unset {
            ref_time = Some(timestamp);
            ref_y = if b > s { b_ema } else { s_ema };
        }

        match mode.observe(b, s) {
            Some(RegimeFlip::ToBuyer) => {
                output.markers.reds.push(Marker::new(timestamp, b_ema));
                ref_time = Some(timestamp);
                ref_y = b_ema;
            }
            Some(RegimeFlip::ToSeller) => {
                output.markers.greens.push(Marker::new(timestamp, s_ema));
                ref_time = Some(timestamp);
                ref_y = s_ema;
            }
            None => {}
        }

        if b > s {
            b_y = b_ema;
        } else if s > b {
            s_y = s_ema;
        } else {
            continue;
        }

        // Total elapsed seconds, so gaps of a day or more are not wrapped
        // back into a sub-day remainder
        let elapsed = ref_time
            .map(|t| (timestamp - t).num_seconds())
            .unwrap_or(0);
        let angle = if elapsed != 0 {
            let dt = elapsed as f64;
            let theta_b = ((b_y - ref_y) / dt).tanh();
            let theta_s = ((s_y - ref_y) / dt).tanh();
            (theta_b - theta_s).abs()
        } else {
            0.0
        };
        output.angles.push(AngleSample { timestamp, angle });
    }

    output
}

/// Same state machine, markers valued at the close price
pub fn detect_price_regimes(inputs: &RegimeInputs<'_>) -> RegimeMarkers {
    let mut markers = RegimeMarkers::default();
    let mut mode = Mode::Unset;

    for i in 0..inputs.len() {
        let timestamp = inputs.timestamps[i];
        match mode.observe(inputs.buyer[i], inputs.seller[i]) {
            Some(RegimeFlip::ToBuyer) => markers.reds.push(Marker::new(timestamp, inputs.close[i])),
            Some(RegimeFlip::ToSeller) => {
                markers.greens.push(Marker::new(timestamp, inputs.close[i]))
            }
            None => {}
        }
    }

    markers
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeEventDetector;

impl RegimeEventDetector {
    /// Run both variants over the table
    pub fn detect(
        &self,
        table: &SeriesTable,
    ) -> Result<(EmaRegimeOutput, RegimeMarkers), PipelineError> {
        let timestamps = table.timestamps();
        let close = table.bar_values(|b| b.close);
        let inputs = RegimeInputs {
            timestamps: &timestamps,
            buyer: table.get(Column::Buyer)?,
            seller: table.get(Column::Seller)?,
            buyer_ema: table.get(Column::BuyerEma)?,
            seller_ema: table.get(Column::SellerEma)?,
            close: &close,
        };

        let ema = detect_ema_regimes(&inputs);
        let price = detect_price_regimes(&inputs);

        tracing::debug!(
            "Regime flips: ema {} reds / {} greens, price {} reds / {} greens",
            ema.markers.reds.len(),
            ema.markers.greens.len(),
            price.reds.len(),
            price.greens.len()
        );

        Ok((ema, price))
    }
}
