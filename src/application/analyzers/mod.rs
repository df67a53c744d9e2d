pub mod fomc;
pub mod precious_metals;
pub mod price_alerts;
