//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | SensorPort         | ESP32 ADC, I²C           |
//! |                | ActuatorPort       | Relay GPIO, LEDC servo   |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `notify_sink`  | EventSink          | Notifier channel         |
//! | `shared_feeds` | ForecastPort       | Forecast mailbox         |
//! |                | ConnectivityPort   | Online flag              |
//! | `time`         | -                  | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod notify_sink;
pub mod shared_feeds;
pub mod time;
