// src/common/format.rs

// Utilitários de formatação de documentos e telefones (padrão brasileiro)
// e cálculo de distância usado no filtro por raio das lideranças.

use crate::common::error::AppError;

pub fn somente_digitos(valor: &str) -> String {
    valor.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normaliza o telefone para DDD + número (10 ou 11 dígitos).
pub fn normalizar_telefone(telefone: &str) -> Result<String, AppError> {
    let digitos = somente_digitos(telefone);
    if !(10..=11).contains(&digitos.len()) {
        return Err(AppError::BadRequest(
            "Telefone inválido. Use formato DDD + número (10 ou 11 dígitos)".to_string(),
        ));
    }
    Ok(digitos)
}

/// Confere os dois dígitos verificadores do CPF.
pub fn cpf_valido(cpf: &str) -> bool {
    let digitos: Vec<u32> = somente_digitos(cpf)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digitos.len() != 11 || digitos.iter().all(|d| *d == digitos[0]) {
        return false;
    }

    let verificador = |len: usize| -> u32 {
        let soma: u32 = digitos[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let resto = (soma * 10) % 11;
        if resto == 10 { 0 } else { resto }
    };

    verificador(9) == digitos[9] && verificador(10) == digitos[10]
}

const RAIO_TERRA_KM: f64 = 6371.0;

/// Distância de Haversine, em km, entre dois pontos (lat, lng) em graus.
pub fn distancia_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lng2) = (b.0.to_radians(), b.1.to_radians());

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * RAIO_TERRA_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telefone_normalization() {
        assert_eq!(normalizar_telefone("(61) 99876-5432").unwrap(), "61998765432");
        assert_eq!(normalizar_telefone("61 3344-5566").unwrap(), "6133445566");
        assert!(normalizar_telefone("99876-5432").is_err());
        assert!(normalizar_telefone("+55 61 99876-5432").is_err());
    }

    #[test]
    fn cpf_check_digits() {
        assert!(cpf_valido("930.951.352-70"));
        assert!(cpf_valido("52998224725"));
        assert!(!cpf_valido("52998224726"));
        assert!(!cpf_valido("11111111111"));
        assert!(!cpf_valido("123"));
    }

    #[test]
    fn haversine_known_distance() {
        // Brasília -> Goiânia, ~178 km em linha reta
        let brasilia = (-15.7939, -47.8828);
        let goiania = (-16.6869, -49.2648);
        let d = distancia_km(brasilia, goiania);
        assert!((d - 178.0).abs() < 3.0, "distância inesperada: {}", d);

        assert!(distancia_km(brasilia, brasilia) < 1e-9);
    }
}
