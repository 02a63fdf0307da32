pub use self::weather::{get_current_weather, get_current_weather_declaration};

mod weather;
