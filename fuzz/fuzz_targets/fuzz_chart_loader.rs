#![no_main]

use libfuzzer_sys::fuzz_target;
use notefall_chart::{ChartLoader, LANE_COUNT, LoadOptions, TempoMode};

fuzz_target!(|data: &[u8]| {
    for tempo_mode in [TempoMode::TempoMap, TempoMode::Fixed] {
        let Ok(chart) = ChartLoader::load_bytes_with(data, LoadOptions { tempo_mode }) else {
            continue;
        };
        assert!(!chart.is_empty());
        for pair in chart.notes().windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert!(chart.notes().iter().all(|n| n.lane < LANE_COUNT));
    }
});
