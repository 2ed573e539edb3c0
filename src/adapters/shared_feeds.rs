//! Reads the forecast mailbox and online flag published by the network
//! side (see [`crate::channels`]).

use crate::app::ports::{ConnectivityPort, ForecastPort};
use crate::channels;
use crate::weather::ForecastSnapshot;

#[derive(Debug, Default, Clone, Copy)]
pub struct SharedFeeds;

impl ForecastPort for SharedFeeds {
    fn latest_forecast(&self) -> Option<ForecastSnapshot> {
        channels::latest_forecast()
    }
}

impl ConnectivityPort for SharedFeeds {
    fn is_online(&self) -> bool {
        channels::is_online()
    }
}
