mod json;
mod queries;
mod types;

pub use json::{
    FollowUpItem, decode_attendance, decode_follow_ups, decode_string_array, encode_follow_ups,
    is_done_status, is_in_progress_status, overall_monev_status,
};
pub use queries::*;
pub use types::*;
