// src/services/cadastro_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        format::{cpf_valido, distancia_km, normalizar_telefone, somente_digitos},
        response::{PaginatedResponse, Pagination},
    },
    db::{
        cadastro_repo::ORDENACAO_LIDERANCA,
        referencia::{exigir_da_campanha, Referencia},
        CadastroRepository,
    },
    models::campanha::{
        AreaComContagem, AreaFiltro, AtualizarEleitorPayload, AtualizarLiderancaPayload, Area, Colaborador,
        ColaboradorFiltro, CoordenadorRegional, Eleitor, EleitorFiltro, Lideranca, LiderancaFiltro, Municipio,
        MunicipioQuery, NovaAreaPayload, NovaLiderancaPayload, NovoColaboradorPayload, NovoEleitorPayload,
    },
};

/// Filtra pelo raio e corta a página em memória. Lideranças sem
/// coordenadas ficam de fora.
pub fn filtrar_por_raio(
    liderancas: Vec<Lideranca>,
    centro: (f64, f64),
    raio_km: f64,
    pagination: &Pagination,
) -> (Vec<Lideranca>, i64) {
    let dentro: Vec<Lideranca> = liderancas
        .into_iter()
        .filter(|l| matches!(l.coordenadas(), Some(c) if distancia_km(centro, c) <= raio_km))
        .collect();

    let total = dentro.len() as i64;
    let pagina = dentro
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(pagination.limit()).unwrap_or(usize::MAX))
        .collect();

    (pagina, total)
}

// CPF opcional: quando vem, é gravado só com dígitos e precisa ser válido
fn normalizar_cpf(cpf: Option<&str>) -> Result<Option<String>, AppError> {
    match cpf.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(c) if cpf_valido(c) => Ok(Some(somente_digitos(c))),
        Some(_) => Err(AppError::BadRequest("CPF inválido".into())),
    }
}

fn normalizar_telefone_opcional(telefone: Option<&str>) -> Result<Option<String>, AppError> {
    match telefone.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(t) => normalizar_telefone(t).map(Some),
    }
}

#[derive(Clone)]
pub struct CadastroService {
    repo: CadastroRepository,
}

impl CadastroService {
    pub fn new(repo: CadastroRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  ELEITORES
    // =========================================================================

    pub async fn listar_eleitores(
        &self,
        campanha_id: Uuid,
        filtro: &EleitorFiltro,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<Eleitor>, AppError> {
        let (eleitores, total) = self.repo.listar_eleitores(campanha_id, filtro, pagination).await?;
        Ok(PaginatedResponse::new(eleitores, total, pagination))
    }

    pub async fn criar_eleitor(
        &self,
        campanha_id: Uuid,
        responsavel: Uuid,
        mut payload: NovoEleitorPayload,
    ) -> Result<Eleitor, AppError> {
        payload.validate()?;
        payload.cpf = normalizar_cpf(payload.cpf.as_deref())?;
        payload.telefone = normalizar_telefone_opcional(payload.telefone.as_deref())?;
        exigir_da_campanha(self.repo.pool(), Referencia::Area, payload.area_id, campanha_id).await?;

        let eleitor = self
            .repo
            .criar_eleitor(self.repo.pool(), campanha_id, &payload, Some(responsavel))
            .await?;
        tracing::info!("🗳️ Eleitor {} cadastrado na campanha {}", eleitor.id, campanha_id);
        Ok(eleitor)
    }

    pub async fn atualizar_eleitor(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        mut payload: AtualizarEleitorPayload,
    ) -> Result<Eleitor, AppError> {
        payload.validate()?;
        payload.cpf = normalizar_cpf(payload.cpf.as_deref())?;
        payload.telefone = normalizar_telefone_opcional(payload.telefone.as_deref())?;
        exigir_da_campanha(self.repo.pool(), Referencia::Area, payload.area_id, campanha_id).await?;

        self.repo
            .atualizar_eleitor(campanha_id, id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Eleitor não encontrado".into()))
    }

    pub async fn desativar_eleitor(&self, campanha_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.desativar_eleitor(campanha_id, id).await? {
            return Err(AppError::NotFound("Eleitor não encontrado".into()));
        }
        Ok(())
    }

    // =========================================================================
    //  LIDERANÇAS
    // =========================================================================

    pub async fn listar_liderancas(
        &self,
        campanha_id: Uuid,
        filtro: &LiderancaFiltro,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<Lideranca>, AppError> {
        let (liderancas, total) = match filtro.centro_e_raio() {
            Some((centro, raio_km)) => {
                if raio_km <= 0.0 {
                    return Err(AppError::BadRequest("raio_km deve ser positivo".into()));
                }
                let ordem = pagination.order_clause(ORDENACAO_LIDERANCA, "nome_completo");
                let todas = self
                    .repo
                    .listar_liderancas_com_coordenadas(campanha_id, filtro, ordem)
                    .await?;
                filtrar_por_raio(todas, centro, raio_km, pagination)
            }
            None => self.repo.listar_liderancas(campanha_id, filtro, pagination).await?,
        };

        Ok(PaginatedResponse::new(liderancas, total, pagination))
    }

    pub async fn criar_lideranca(
        &self,
        campanha_id: Uuid,
        mut payload: NovaLiderancaPayload,
    ) -> Result<Lideranca, AppError> {
        payload.validate()?;
        payload.telefone = normalizar_telefone_opcional(payload.telefone.as_deref())?;
        exigir_da_campanha(
            self.repo.pool(),
            Referencia::CoordenadorRegional,
            payload.coordenador_regional_id,
            campanha_id,
        )
        .await?;

        let lideranca = self
            .repo
            .criar_lideranca(self.repo.pool(), campanha_id, &payload, "ativo")
            .await?;
        tracing::info!("🤝 Liderança {} cadastrada na campanha {}", lideranca.id, campanha_id);
        Ok(lideranca)
    }

    pub async fn atualizar_lideranca(
        &self,
        campanha_id: Uuid,
        id: Uuid,
        mut payload: AtualizarLiderancaPayload,
    ) -> Result<Lideranca, AppError> {
        payload.validate()?;
        payload.telefone = normalizar_telefone_opcional(payload.telefone.as_deref())?;
        exigir_da_campanha(
            self.repo.pool(),
            Referencia::CoordenadorRegional,
            payload.coordenador_regional_id,
            campanha_id,
        )
        .await?;

        self.repo
            .atualizar_lideranca(campanha_id, id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Liderança não encontrada".into()))
    }

    pub async fn desativar_lideranca(&self, campanha_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.desativar_lideranca(campanha_id, id).await? {
            return Err(AppError::NotFound("Liderança não encontrada".into()));
        }
        Ok(())
    }

    // =========================================================================
    //  COORDENADORES, COLABORADORES, ÁREAS, MUNICÍPIOS
    // =========================================================================

    pub async fn listar_coordenadores(&self, campanha_id: Uuid) -> Result<Vec<CoordenadorRegional>, AppError> {
        self.repo.listar_coordenadores(campanha_id).await
    }

    pub async fn listar_colaboradores(
        &self,
        campanha_id: Uuid,
        filtro: &ColaboradorFiltro,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<Colaborador>, AppError> {
        let (colaboradores, total) = self.repo.listar_colaboradores(campanha_id, filtro, pagination).await?;
        Ok(PaginatedResponse::new(colaboradores, total, pagination))
    }

    pub async fn buscar_colaboradores(&self, campanha_id: Uuid, termo: Option<&str>) -> Result<Vec<Colaborador>, AppError> {
        match termo.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => self.repo.buscar_colaboradores(campanha_id, t).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn criar_colaborador(
        &self,
        campanha_id: Uuid,
        mut payload: NovoColaboradorPayload,
    ) -> Result<Colaborador, AppError> {
        payload.validate()?;
        payload.telefone = normalizar_telefone_opcional(payload.telefone.as_deref())?;
        payload.email = payload.email.map(|e| e.trim().to_lowercase());

        self.repo
            .criar_colaborador(self.repo.pool(), campanha_id, None, &payload)
            .await
    }

    pub async fn listar_areas(
        &self,
        campanha_id: Uuid,
        filtro: &AreaFiltro,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<AreaComContagem>, AppError> {
        let (areas, total) = self.repo.listar_areas(campanha_id, filtro, pagination).await?;
        Ok(PaginatedResponse::new(areas, total, pagination))
    }

    pub async fn criar_area(&self, campanha_id: Uuid, payload: NovaAreaPayload) -> Result<Area, AppError> {
        payload.validate()?;
        self.repo.criar_area(campanha_id, &payload, false).await
    }

    pub async fn listar_municipios(&self, query: &MunicipioQuery) -> Result<Vec<Municipio>, AppError> {
        self.repo.listar_municipios(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lideranca(nome: &str, coordenadas: Option<(f64, f64)>) -> Lideranca {
        let agora = Utc::now();
        Lideranca {
            id: Uuid::new_v4(),
            campanha_id: Uuid::new_v4(),
            profile_id: None,
            coordenador_regional_id: None,
            nome_completo: nome.into(),
            nome_popular: None,
            telefone: None,
            tipo: "comunitaria".into(),
            nivel: None,
            alcance_estimado: None,
            cidade: None,
            bairro: None,
            estado: None,
            cep: None,
            logradouro: None,
            numero: None,
            complemento: None,
            latitude: coordenadas.map(|c| c.0),
            longitude: coordenadas.map(|c| c.1),
            status: "ativo".into(),
            ativo: true,
            created_at: agora,
            updated_at: agora,
        }
    }

    // Brasília (Esplanada) como centro
    const CENTRO: (f64, f64) = (-15.7975, -47.8919);

    #[test]
    fn radius_keeps_only_nearby_leaders() {
        let todas = vec![
            lideranca("Asa Sul", Some((-15.8100, -47.8900))),
            lideranca("Goiânia", Some((-16.6869, -49.2648))),
            lideranca("Sem endereço", None),
            lideranca("Taguatinga", Some((-15.8330, -48.0560))),
        ];

        let (pagina, total) = filtrar_por_raio(todas, CENTRO, 25.0, &Pagination::default());
        assert_eq!(total, 2);
        let nomes: Vec<&str> = pagina.iter().map(|l| l.nome_completo.as_str()).collect();
        assert_eq!(nomes, vec!["Asa Sul", "Taguatinga"]);
    }

    #[test]
    fn radius_pagination_happens_after_filter() {
        let todas: Vec<Lideranca> = (0..5)
            .map(|i| lideranca(&format!("L{}", i), Some((-15.80, -47.89))))
            .chain(std::iter::once(lideranca("Longe", Some((-3.72, -38.54)))))
            .collect();

        let p = Pagination { page: Some(2), limit: Some(2), ..Default::default() };
        let (pagina, total) = filtrar_por_raio(todas, CENTRO, 10.0, &p);
        assert_eq!(total, 5);
        assert_eq!(pagina.len(), 2);
        assert_eq!(pagina[0].nome_completo, "L2");
    }

    #[test]
    fn radius_with_huge_page_is_empty() {
        let todas = vec![lideranca("Asa Sul", Some((-15.8100, -47.8900)))];
        let p = Pagination { page: Some(i64::MAX), limit: Some(100), ..Default::default() };

        let (pagina, total) = filtrar_por_raio(todas, CENTRO, 25.0, &p);
        assert_eq!(total, 1);
        assert!(pagina.is_empty());
    }

    #[test]
    fn cpf_is_optional_but_checked() {
        assert_eq!(normalizar_cpf(None).unwrap(), None);
        assert_eq!(normalizar_cpf(Some("  ")).unwrap(), None);
        assert_eq!(normalizar_cpf(Some("529.982.247-25")).unwrap().as_deref(), Some("52998224725"));
        assert!(matches!(normalizar_cpf(Some("111.111.111-11")), Err(AppError::BadRequest(_))));
    }
}
