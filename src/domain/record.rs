use serde::Serialize;

/// Placeholder written for every field the extraction could not recover.
pub const NOT_INFORMED: &str = "Não informado";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRecord {
    pub nicho: String,
    pub cidade: String,
    pub nome: String,
    pub endereco: String,
    pub telefone: String,
    pub avaliacao: String,
    pub num_avaliacoes: String,
}

impl BusinessRecord {
    pub fn not_informed() -> Self {
        BusinessRecord {
            nicho: NOT_INFORMED.to_string(),
            cidade: NOT_INFORMED.to_string(),
            nome: NOT_INFORMED.to_string(),
            endereco: NOT_INFORMED.to_string(),
            telefone: NOT_INFORMED.to_string(),
            avaliacao: NOT_INFORMED.to_string(),
            num_avaliacoes: NOT_INFORMED.to_string(),
        }
    }

    pub fn tag(mut self, nicho: &str, cidade: &str) -> Self {
        self.nicho = nicho.to_string();
        self.cidade = cidade.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchTarget {
    pub nicho: String,
    pub cidade: String,
}

impl SearchTarget {
    pub fn query(&self) -> String {
        format!("{} em {}", self.nicho, self.cidade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_joins_niche_and_city() {
        let target = SearchTarget {
            nicho: "auto peças".to_string(),
            cidade: "Cambé".to_string(),
        };

        assert_eq!(target.query(), "auto peças em Cambé");
    }

    #[test]
    fn tag_overwrites_niche_and_city_only() {
        let record = BusinessRecord::not_informed().tag("padaria", "Cambé");

        assert_eq!(record.nicho, "padaria");
        assert_eq!(record.cidade, "Cambé");
        assert_eq!(record.nome, NOT_INFORMED);
        assert_eq!(record.telefone, NOT_INFORMED);
    }
}
