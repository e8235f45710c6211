mod time_utils;

pub use time_utils::{
    TimeUtils, epoch_ms_to_date_string, epoch_sec_to_date_string, parse_date_to_epoch_sec,
};
