/// Urban driving speed used for travel-time estimates.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 35.0;

pub const DEFAULT_BUFFER_MINUTES: i32 = 10;
pub const MAX_BUFFER_MINUTES: i32 = 120;

pub const MAX_OPPORTUNITY_SCORE: i32 = 10;

pub const DEFAULT_HTTP_BIND_ADDR: &str = "0.0.0.0:8080";

pub fn default_buffer_minutes() -> i32 {
    DEFAULT_BUFFER_MINUTES
}
