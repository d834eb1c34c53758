use crate::cli::RequestSource;
use serde_json::Value;
use std::io::Read;

/// Read and parse a JSON request body.
pub fn read_request(source: &RequestSource) -> anyhow::Result<Value> {
    let (raw, origin) = match source {
        RequestSource::Stdin => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| anyhow::anyhow!("failed to read request from stdin: {e}"))?;
            (raw, "stdin".to_string())
        }
        RequestSource::File(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("failed to read request file {}: {e}", path.display())
            })?;
            (raw, path.display().to_string())
        }
    };

    parse_request(&raw).map_err(|e| anyhow::anyhow!("invalid request JSON from {origin}: {e}"))
}

fn parse_request(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_request("  \n").unwrap(), json!({}));
    }

    #[test]
    fn keeps_key_order() {
        let v = parse_request(r#"{"updates": {"z": 1, "a": 2}}"#).unwrap();
        let keys: Vec<&String> = v["updates"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn reads_file() {
        let path = std::env::temp_dir().join(format!("tabcrud-request-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"where": []}"#).unwrap();
        let v = read_request(&RequestSource::File(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(v, json!({"where": []}));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_request(&RequestSource::File("/nonexistent/req.json".into())).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/req.json"));
    }
}
