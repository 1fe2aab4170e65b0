//! Core types for amplifier sessions.
//!
//! - [`AmplifierType`] maps hardware models to their fixed scaling factors
//! - [`PacketFormat`] selects one of the two wire record layouts
//! - [`NetCode`] infers the EEG channel count from the electrode net
//! - [`StreamDescriptor`] is the one-time announcement handed to the sink

mod amp;
mod descriptor;

pub use amp::{AmplifierType, NetCode, PacketFormat};
pub use descriptor::{AcquisitionInfo, SampleFormat, StreamDescriptor};

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_scaling_factor_is_one_of_the_four_constants(
            amp_type in prop::sample::select(vec![
                AmplifierType::Unknown,
                AmplifierType::NA300,
                AmplifierType::NA400,
                AmplifierType::NA410,
            ])
        ) {
            let factor = amp_type.scaling_factor();
            let table = [0.0244140625f32, 0.00015522042, 0.00009636188, 1.0];
            prop_assert!(table.contains(&factor));
        }

        #[test]
        fn prop_net_code_channel_counts_are_valid(code in any::<u8>()) {
            let channels = NetCode::from_wire(code).channel_count();
            prop_assert!(matches!(channels, 0 | 32 | 64 | 128 | 256));
        }

        #[test]
        fn prop_net_code_decoding_is_total(code in any::<u8>()) {
            // Every byte decodes to some variant; reserved values collapse
            // to Unknown rather than failing.
            let net = NetCode::from_wire(code);
            if code > 15 {
                prop_assert_eq!(net, NetCode::Unknown);
            }
        }
    }
}
