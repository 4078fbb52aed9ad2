use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: u32,
    pub sigla: String,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: u64,
    pub nome: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn municipality_ignores_extra_lookup_fields() {
        let body = r#"{"id":4103708,"nome":"Cambé","microrregiao":{"id":41170,"nome":"Londrina"}}"#;
        let municipality: Municipality = serde_json::from_str(body).unwrap();

        assert_eq!(
            municipality,
            Municipality {
                id: 4103708,
                nome: "Cambé".to_string()
            }
        );
    }
}
