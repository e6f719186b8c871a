//! Fixtures for tests

use crate::input::household::Household;
use crate::scenario::{Action, ReductionLevel};
use crate::tariff::{
    NON_SUPPORTED_TARIFF_ID, SUPPORTED_TARIFF_ID, TariffMap, TariffSchedule, default_tariffs,
};
use crate::units::{Energy, Power};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn tariffs() -> TariffMap {
    default_tariffs().unwrap()
}

#[fixture]
pub fn supported_tariff(tariffs: TariffMap) -> TariffSchedule {
    tariffs[SUPPORTED_TARIFF_ID].clone()
}

#[fixture]
pub fn non_supported_tariff(tariffs: TariffMap) -> TariffSchedule {
    tariffs[NON_SUPPORTED_TARIFF_ID].clone()
}

#[fixture]
pub fn household() -> Household {
    Household {
        consumption: Energy(400.0),
        tariff: SUPPORTED_TARIFF_ID.into(),
        ac_hours_per_day: 6,
        ac_load: Power(1.0),
        action: Action::LedReplacement,
        reduction: ReductionLevel::TenPercent,
        pv: None,
    }
}
