use serde_json::{Map, Value, json};

use crate::types::FunctionDeclaration;

// Canned readings in celsius; this demo function never calls a weather service.
const READINGS: &[(&str, f64, &str)] = &[
    ("boston", 22.0, "sunny"),
    ("tokyo", 10.0, "cloudy"),
    ("san francisco", 18.0, "foggy"),
    ("paris", 16.0, "rainy"),
];

pub fn get_current_weather_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "get_current_weather".to_string(),
        description: "Get the current weather in a given location".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city and state, e.g. San Francisco, CA"
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "default": "celsius"
                }
            },
            "required": ["location"]
        }),
    }
}

/// Arguments arrive validated with defaults applied.
pub fn get_current_weather(args: &Map<String, Value>) -> Result<String, String> {
    let location = args
        .get("location")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "location must be a string".to_string())?;
    let unit = args
        .get("unit")
        .and_then(|v| v.as_str())
        .unwrap_or("celsius");

    let key = location.to_lowercase();
    let reading = READINGS
        .iter()
        .find(|(city, _, _)| key.contains(city));

    let result = match reading {
        Some((_, celsius, forecast)) => {
            let temperature = match unit {
                "fahrenheit" => celsius * 9.0 / 5.0 + 32.0,
                _ => *celsius,
            };
            json!({
                "location": location,
                "temperature": temperature.round().to_string(),
                "unit": unit,
                "forecast": forecast,
            })
        }
        None => json!({
            "location": location,
            "temperature": "unknown",
            "unit": unit,
        }),
    };
    Ok(result.to_string())
}
