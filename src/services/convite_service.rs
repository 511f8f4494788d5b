// src/services/convite_service.rs

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        format::{normalizar_telefone, somente_digitos},
    },
    db::{
        referencia::{exigir_da_campanha, Referencia},
        CadastroRepository, CampanhaRepository, ConviteRepository, ProfileRepository,
    },
    models::{
        auth::Profile,
        campanha::{Campanha, Lideranca, NovaAreaPayload, NovaLiderancaPayload, NovoColaboradorPayload, NovoEleitorPayload, OnboardingAdminPayload},
        convite::{
            gerar_token, AceitarConviteEleitorPayload, ConfirmarConvitePayload, Convite,
            ConviteAdminEnviado, ConviteComLink, ConviteConfirmado, ConviteCriadoResponse,
            ConviteEleitorAceito, ConviteEleitorCriado, ConviteEleitorPublico, ConviteStatus,
            ConviteValidado, EmitirConvitePayload, NovoConvite, OrigemConvite, PlanoTipo,
        },
        roles::{papel_principal, pode_convidar_algum, Role},
    },
    services::auth::gerar_hash,
};

/// Status final do convite após a confirmação da senha. O admin fica em
/// `aceito` até criar a campanha no onboarding.
pub fn status_apos_confirmacao(role: Role) -> ConviteStatus {
    match role {
        Role::Admin => ConviteStatus::Aceito,
        _ => ConviteStatus::Usado,
    }
}

/// Convite sempre cria uma identidade nova; contato já cadastrado é conflito.
pub fn exigir_contato_livre(existente: Option<&Profile>) -> Result<(), AppError> {
    match existente {
        Some(profile) => {
            tracing::warn!("⚠️ Convite para contato já cadastrado (perfil {})", profile.id);
            Err(AppError::UniqueConstraintViolation(
                "Já existe um usuário com este telefone ou e-mail".into(),
            ))
        }
        None => Ok(()),
    }
}

pub fn mensagem_whatsapp(nome: &str, role: Role, link: &str, horas: i64) -> String {
    format!(
        "Olá, {}! Você foi convidado(a) para participar da nossa campanha como {}.\n\n\
         Acesse o link abaixo para criar sua senha:\n{}\n\n\
         Este convite expira em {} horas.",
        nome,
        role.rotulo(),
        link,
        horas
    )
}

#[derive(Clone)]
pub struct ConviteService {
    pool: PgPool,
    convite_repo: ConviteRepository,
    profile_repo: ProfileRepository,
    cadastro_repo: CadastroRepository,
    campanha_repo: CampanhaRepository,
    site_url: String,
    expires_hours: i64,
}

impl ConviteService {
    pub fn new(
        pool: PgPool,
        convite_repo: ConviteRepository,
        profile_repo: ProfileRepository,
        cadastro_repo: CadastroRepository,
        campanha_repo: CampanhaRepository,
        site_url: String,
        expires_hours: i64,
    ) -> Self {
        Self {
            pool,
            convite_repo,
            profile_repo,
            cadastro_repo,
            campanha_repo,
            site_url,
            expires_hours,
        }
    }

    pub fn link_onboarding(&self, token: &str) -> String {
        format!("{}/mobile/onboarding?token={}", self.site_url, token)
    }

    pub fn link_convite_eleitor(&self, token: &str) -> String {
        format!("{}/convite/eleitor?token={}", self.site_url, token)
    }

    // =========================================================================
    //  EMISSÃO
    // =========================================================================

    pub async fn emitir(
        &self,
        autor: &Profile,
        campanha_id: Uuid,
        payload: EmitirConvitePayload,
    ) -> Result<ConviteCriadoResponse, AppError> {
        payload.validate()?;

        if !pode_convidar_algum(&autor.papeis(), payload.role) {
            return Err(AppError::Forbidden(format!(
                "Você não tem permissão para convidar {}",
                payload.role.rotulo()
            )));
        }

        let telefone = match payload.telefone.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(t) => Some(normalizar_telefone(t)?),
            None => None,
        };
        let email = payload
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        if telefone.is_none() && email.is_none() {
            return Err(AppError::BadRequest("Informe o telefone ou o e-mail do convidado".into()));
        }

        let horas = payload.expires_hours.unwrap_or(self.expires_hours);
        let nome = payload.nome_completo.trim().to_string();

        let mut tx = self.pool.begin().await?;

        exigir_da_campanha(
            &mut *tx,
            Referencia::CoordenadorRegional,
            payload.coordenador_regional_id,
            campanha_id,
        )
        .await?;

        // Liderança provisória: aparece na estrutura antes mesmo do aceite
        let lideranca_id = if payload.role == Role::Lideranca {
            let provisoria = NovaLiderancaPayload {
                nome_completo: nome.clone(),
                nome_popular: payload.nome_popular.clone(),
                telefone: telefone.clone(),
                tipo: payload.tipo_lideranca.clone(),
                nivel: None,
                alcance_estimado: None,
                coordenador_regional_id: payload.coordenador_regional_id,
                cidade: None,
                bairro: None,
                estado: None,
                cep: None,
                logradouro: None,
                numero: None,
                complemento: None,
                latitude: None,
                longitude: None,
            };
            let lideranca = self
                .cadastro_repo
                .criar_lideranca(&mut *tx, campanha_id, &provisoria, "pendente")
                .await?;
            Some(lideranca.id)
        } else {
            None
        };

        let convite = self
            .convite_repo
            .create(
                &mut *tx,
                &NovoConvite {
                    campanha_id: Some(campanha_id),
                    token: gerar_token(),
                    telefone,
                    email,
                    nome_convidado: Some(nome.clone()),
                    role: payload.role,
                    origem: OrigemConvite::App,
                    created_by: Some(autor.id),
                    lideranca_id,
                    coordenador_regional_id: payload.coordenador_regional_id,
                    plano_tipo: None,
                    pagarme_charge_id: None,
                    expires_at: Utc::now() + Duration::hours(horas),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "✉️ Convite {} emitido por {} para papel {}",
            convite.id,
            autor.id,
            payload.role
        );

        let link_onboarding = self.link_onboarding(&convite.token);
        let mensagem_whatsapp = mensagem_whatsapp(&nome, payload.role, &link_onboarding, horas);

        Ok(ConviteCriadoResponse {
            convite,
            link_onboarding,
            mensagem_whatsapp,
        })
    }

    // =========================================================================
    //  VALIDAÇÃO E CONFIRMAÇÃO
    // =========================================================================

    pub async fn validar(&self, token: &str) -> Result<ConviteValidado, AppError> {
        let convite = self
            .convite_repo
            .find_by_token(token.trim())
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;

        convite.verificar_utilizavel(Utc::now())?;

        Ok(ConviteValidado {
            telefone: convite.telefone,
            email: convite.email,
            nome: convite.nome_convidado,
            role: convite.role,
            expires_at: convite.expires_at,
        })
    }

    pub async fn confirmar(&self, payload: ConfirmarConvitePayload) -> Result<ConviteConfirmado, AppError> {
        payload.validate()?;
        let token = payload.token.trim().to_string();

        // Falha rápida antes do bcrypt; a checagem que vale é a de dentro da transação
        self.validar(&token).await?;
        let senha_hash = gerar_hash(payload.senha).await?;

        let mut tx = self.pool.begin().await?;

        let convite = self
            .convite_repo
            .find_by_token_for_update(&mut *tx, &token)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;
        convite.verificar_utilizavel(Utc::now())?;

        let role = convite.role_alvo()?;
        let nome = convite
            .nome_convidado
            .clone()
            .unwrap_or_else(|| role.rotulo().to_string());

        let existente = self
            .profile_repo
            .find_by_contato(&mut *tx, convite.telefone.as_deref(), convite.email.as_deref())
            .await?;
        exigir_contato_livre(existente.as_ref())?;

        // A UNIQUE de telefone/e-mail cobre a corrida com outro cadastro
        let profile = self
            .profile_repo
            .create(
                &mut *tx,
                &nome,
                convite.telefone.as_deref(),
                convite.email.as_deref(),
                &senha_hash,
                role,
                convite.campanha_id,
            )
            .await?;

        let lideranca = self.criar_vinculo_do_papel(&mut tx, &convite, &profile, role, &nome).await?;

        self.convite_repo
            .atualizar_status(&mut *tx, convite.id, status_apos_confirmacao(role))
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Convite {} confirmado pelo perfil {}", convite.id, profile.id);

        if let Some(lideranca) = lideranca {
            if let Err(e) = self.vincular_area(&lideranca).await {
                tracing::warn!("⚠️ Não foi possível vincular a liderança {} a uma área: {}", lideranca.id, e);
            }
        }

        Ok(ConviteConfirmado {
            profile_id: profile.id,
            telefone: profile.telefone,
            email: profile.email,
            nome: profile.nome_completo,
            role,
        })
    }

    // Linha do papel na estrutura da campanha. Retorna a liderança ativada, se houver.
    async fn criar_vinculo_do_papel(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        convite: &Convite,
        profile: &Profile,
        role: Role,
        nome: &str,
    ) -> Result<Option<Lideranca>, AppError> {
        if matches!(role, Role::Admin | Role::Masteradmin) {
            return Ok(None);
        }

        let campanha_id = convite
            .campanha_id
            .ok_or_else(|| AppError::BadRequest("Convite sem campanha vinculada".into()))?;

        match role {
            Role::Coordenador => {
                self.cadastro_repo
                    .criar_coordenador(&mut **tx, campanha_id, profile.id, nome, convite.telefone.as_deref())
                    .await?;
                Ok(None)
            }
            Role::Colaborador => {
                let dados = NovoColaboradorPayload {
                    nome_completo: nome.to_string(),
                    email: convite.email.clone(),
                    telefone: convite.telefone.clone(),
                    funcao: None,
                };
                self.cadastro_repo
                    .criar_colaborador(&mut **tx, campanha_id, Some(profile.id), &dados)
                    .await?;
                Ok(None)
            }
            Role::Lideranca => {
                let lideranca_id = match convite.lideranca_id {
                    Some(id) => id,
                    None => {
                        let dados = NovaLiderancaPayload {
                            nome_completo: nome.to_string(),
                            nome_popular: None,
                            telefone: convite.telefone.clone(),
                            tipo: None,
                            nivel: None,
                            alcance_estimado: None,
                            coordenador_regional_id: convite.coordenador_regional_id,
                            cidade: None,
                            bairro: None,
                            estado: None,
                            cep: None,
                            logradouro: None,
                            numero: None,
                            complemento: None,
                            latitude: None,
                            longitude: None,
                        };
                        self.cadastro_repo
                            .criar_lideranca(&mut **tx, campanha_id, &dados, "ativo")
                            .await?
                            .id
                    }
                };
                let lideranca = self
                    .cadastro_repo
                    .ativar_lideranca(&mut **tx, lideranca_id, profile.id)
                    .await?;
                Ok(Some(lideranca))
            }
            Role::Eleitor => {
                let dados = NovoEleitorPayload {
                    nome_completo: nome.to_string(),
                    cpf: None,
                    email: convite.email.clone(),
                    telefone: convite.telefone.clone(),
                    data_nascimento: None,
                    area_id: None,
                };
                self.cadastro_repo
                    .criar_eleitor(&mut **tx, campanha_id, &dados, convite.created_by)
                    .await?;
                Ok(None)
            }
            Role::Admin | Role::Masteradmin => Ok(None),
        }
    }

    /// Liga a liderança à área do seu bairro. Sem área cadastrada, cria uma
    /// marcada para revisão.
    async fn vincular_area(&self, lideranca: &Lideranca) -> Result<(), AppError> {
        let (Some(cidade), Some(bairro)) = (lideranca.cidade.as_deref(), lideranca.bairro.as_deref()) else {
            return Ok(());
        };

        let municipio = self
            .cadastro_repo
            .find_municipio_por_nome(cidade, lideranca.estado.as_deref())
            .await?;
        let municipio_id = municipio.as_ref().map(|m| m.id);

        let area = match self
            .cadastro_repo
            .find_area_por_bairro(lideranca.campanha_id, municipio_id, cidade, bairro)
            .await?
        {
            Some(area) => area,
            None => {
                let dados = NovaAreaPayload {
                    nome: bairro.to_string(),
                    codigo: None,
                    descricao: None,
                    tipo: Some("bairro".into()),
                    municipio_id,
                    cidade: Some(cidade.to_string()),
                    bairro: Some(bairro.to_string()),
                    estado: lideranca.estado.clone(),
                    latitude: lideranca.latitude,
                    longitude: lideranca.longitude,
                };
                let area = self.cadastro_repo.criar_area(lideranca.campanha_id, &dados, true).await?;
                tracing::info!("🗺️ Área {} criada para revisão ({} / {})", area.id, cidade, bairro);
                area
            }
        };

        self.cadastro_repo
            .vincular_lideranca_area(lideranca.campanha_id, lideranca.id, area.id)
            .await
    }

    // =========================================================================
    //  GESTÃO
    // =========================================================================

    pub async fn listar_pendentes(&self, campanha_id: Uuid) -> Result<Vec<ConviteComLink>, AppError> {
        let convites = self.convite_repo.listar_pendentes(campanha_id).await?;
        Ok(convites
            .into_iter()
            .map(|convite| ConviteComLink {
                link_onboarding: self.link_onboarding(&convite.token),
                convite,
            })
            .collect())
    }

    pub async fn cancelar(&self, autor: &Profile, campanha_id: Uuid, id: Uuid) -> Result<Convite, AppError> {
        let convite = self
            .convite_repo
            .find_by_id(id, campanha_id)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;

        let gestor = autor.papeis().iter().any(Role::is_gestor);
        if !gestor && convite.created_by != Some(autor.id) {
            return Err(AppError::Forbidden("Você só pode cancelar convites que emitiu".into()));
        }

        match convite.status {
            ConviteStatus::Pendente => {}
            ConviteStatus::Cancelado => return Err(AppError::ConviteCancelado),
            ConviteStatus::Aceito | ConviteStatus::Usado => return Err(AppError::ConviteJaUtilizado),
        }

        // Pode ter sido confirmado entre a leitura e o UPDATE
        let cancelado = self
            .convite_repo
            .cancelar(id, campanha_id)
            .await?
            .ok_or(AppError::ConviteJaUtilizado)?;

        if let Some(lideranca_id) = cancelado.lideranca_id {
            self.cadastro_repo.desativar_lideranca(campanha_id, lideranca_id).await?;
        }

        tracing::info!("🚫 Convite {} cancelado por {}", id, autor.id);
        Ok(cancelado)
    }

    // =========================================================================
    //  ADMINISTRADORES
    // =========================================================================

    /// Linha do convite de admin (sem campanha), ainda não gravada.
    pub fn novo_convite_admin(
        &self,
        email: &str,
        origem: OrigemConvite,
        plano_tipo: PlanoTipo,
        created_by: Option<Uuid>,
        pagarme_charge_id: Option<String>,
    ) -> NovoConvite {
        NovoConvite {
            campanha_id: None,
            token: gerar_token(),
            telefone: None,
            email: Some(email.trim().to_lowercase()),
            nome_convidado: None,
            role: Role::Admin,
            origem,
            created_by,
            lideranca_id: None,
            coordenador_regional_id: None,
            plano_tipo: Some(plano_tipo),
            pagarme_charge_id,
            expires_at: Utc::now() + Duration::hours(self.expires_hours),
        }
    }

    // A entrega é o link no log
    pub fn anunciar_convite_admin(&self, convite: &Convite) -> ConviteAdminEnviado {
        let email = convite.email.clone().unwrap_or_default();
        let link_onboarding = self.link_onboarding(&convite.token);
        tracing::info!(
            "📧 Convite de admin ({}, plano {}) para {}: {}",
            convite.origem,
            convite.plano_tipo.as_deref().unwrap_or("-"),
            email,
            link_onboarding
        );

        ConviteAdminEnviado {
            convite_id: convite.id,
            email,
            link_onboarding,
        }
    }

    /// Convite de admin por e-mail, emitido manualmente.
    pub async fn convidar_admin(
        &self,
        email: &str,
        origem: OrigemConvite,
        plano_tipo: PlanoTipo,
        created_by: Option<Uuid>,
        pagarme_charge_id: Option<String>,
    ) -> Result<ConviteAdminEnviado, AppError> {
        let novo = self.novo_convite_admin(email, origem, plano_tipo, created_by, pagarme_charge_id);
        let convite = self.convite_repo.create(&self.pool, &novo).await?;
        Ok(self.anunciar_convite_admin(&convite))
    }

    /// Admin recém-confirmado cria a campanha e passa a pertencer a ela.
    pub async fn concluir_onboarding_admin(
        &self,
        profile: &Profile,
        payload: OnboardingAdminPayload,
    ) -> Result<Campanha, AppError> {
        payload.validate()?;

        if !profile.tem_papel(Role::Admin) {
            return Err(AppError::Forbidden("Apenas administradores podem criar campanhas".into()));
        }
        if profile.campanha_id.is_some() {
            return Err(AppError::BadRequest("Onboarding já concluído para este usuário".into()));
        }

        let mut tx = self.pool.begin().await?;

        let convite = self
            .convite_repo
            .find_admin_aceito_for_update(&mut *tx, profile.telefone.as_deref(), profile.email.as_deref())
            .await?;

        let campanha = self
            .campanha_repo
            .create(
                &mut *tx,
                &payload,
                convite.as_ref().and_then(|c| c.plano_tipo.as_deref()),
                profile.id,
            )
            .await?;

        self.profile_repo.definir_campanha(&mut *tx, profile.id, campanha.id).await?;

        if let Some(convite) = &convite {
            self.convite_repo
                .atualizar_status(&mut *tx, convite.id, ConviteStatus::Usado)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("🏁 Campanha {} criada pelo admin {}", campanha.id, profile.id);
        Ok(campanha)
    }

    // =========================================================================
    //  CONVITES DE ELEITOR
    // =========================================================================

    pub async fn gerar_convite_eleitor(
        &self,
        autor: &Profile,
        campanha_id: Uuid,
    ) -> Result<ConviteEleitorCriado, AppError> {
        let principal = papel_principal(&autor.papeis())
            .filter(|r| *r <= Role::Lideranca)
            .ok_or_else(|| AppError::Forbidden("Sem permissão para gerar links de eleitor".into()))?;

        // Link de liderança credita a própria liderança; os demais, o perfil
        let (origem_tipo, origem_id) = if principal == Role::Lideranca {
            let lideranca = self
                .cadastro_repo
                .find_lideranca_by_profile(&self.pool, campanha_id, autor.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Liderança não encontrada para este usuário".into()))?;
            ("lideranca", lideranca.id)
        } else {
            (principal.as_str(), autor.id)
        };

        let convite = self
            .convite_repo
            .criar_convite_eleitor(&self.pool, campanha_id, &gerar_token(), origem_tipo, Some(origem_id))
            .await?;

        Ok(ConviteEleitorCriado {
            link_compartilhar: self.link_convite_eleitor(&convite.token),
            convite_id: convite.id,
            token: convite.token,
        })
    }

    pub async fn validar_convite_eleitor(&self, token: &str) -> Result<ConviteEleitorPublico, AppError> {
        let convite = self
            .convite_repo
            .find_eleitor_by_token(token.trim())
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;

        convite.verificar_utilizavel(Utc::now())?;

        let campanha = self
            .campanha_repo
            .find_publica(convite.campanha_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Campanha não encontrada".into()))?;

        self.convite_repo.registrar_clique(convite.id).await?;

        Ok(ConviteEleitorPublico {
            convite_id: convite.id,
            campanha,
            origem_tipo: convite.origem_tipo,
        })
    }

    pub async fn aceitar_convite_eleitor(
        &self,
        payload: AceitarConviteEleitorPayload,
    ) -> Result<ConviteEleitorAceito, AppError> {
        payload.validate()?;

        if !payload.aceite_lgpd {
            return Err(AppError::BadRequest("É necessário aceitar os termos para prosseguir".into()));
        }

        let mut tx = self.pool.begin().await?;

        let convite = self
            .convite_repo
            .find_eleitor_by_token_for_update(&mut *tx, payload.token.trim())
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;
        convite.verificar_utilizavel(Utc::now())?;

        let area_id = self.cadastro_repo.find_area_padrao(&mut *tx, convite.campanha_id).await?;

        let dados = NovoEleitorPayload {
            nome_completo: payload.nome_completo.trim().to_string(),
            cpf: None,
            email: None,
            telefone: Some(somente_digitos(&payload.telefone)),
            data_nascimento: None,
            area_id,
        };
        let eleitor = self
            .cadastro_repo
            .criar_eleitor(&mut *tx, convite.campanha_id, &dados, convite.origem_id)
            .await?;

        self.convite_repo
            .marcar_eleitor_usado(&mut *tx, convite.id, eleitor.id)
            .await?;

        if let (Some(lideranca_id), "lideranca") = (convite.origem_id, convite.origem_tipo.as_str()) {
            self.cadastro_repo
                .vincular_lideranca_eleitor(&mut *tx, convite.campanha_id, lideranca_id, eleitor.id, "convite_link")
                .await?;
        }

        // Novo link para o eleitor compartilhar
        let novo = self
            .convite_repo
            .criar_convite_eleitor(&mut *tx, convite.campanha_id, &gerar_token(), "eleitor", Some(eleitor.id))
            .await?;

        tx.commit().await?;

        tracing::info!("🗳️ Eleitor {} cadastrado via link {}", eleitor.id, convite.id);

        Ok(ConviteEleitorAceito {
            eleitor_id: eleitor.id,
            link_compartilhar: Some(self.link_convite_eleitor(&novo.token)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn perfil_existente() -> Profile {
        let agora = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            nome_completo: "Admin da Campanha".into(),
            email: Some("admin@campanha.com".into()),
            telefone: Some("61999990000".into()),
            cpf: None,
            roles: vec!["admin".into()],
            campanha_id: Some(Uuid::new_v4()),
            senha_hash: Some("$2b$12$hashoriginal".into()),
            auth_method: "mobile".into(),
            status: "ativo".into(),
            ultimo_acesso: None,
            created_at: agora,
            updated_at: agora,
        }
    }

    #[test]
    fn existing_contact_is_a_conflict() {
        assert!(exigir_contato_livre(None).is_ok());

        let existente = perfil_existente();
        let err = exigir_contato_livre(Some(&existente)).unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));
    }

    fn service(pool: &PgPool) -> ConviteService {
        ConviteService::new(
            pool.clone(),
            ConviteRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            CadastroRepository::new(pool.clone()),
            CampanhaRepository::new(pool.clone()),
            "http://localhost:3000".into(),
            48,
        )
    }

    #[sqlx::test]
    #[ignore = "requer Postgres (DATABASE_URL)"]
    async fn invite_for_existing_phone_keeps_stored_password(pool: PgPool) {
        let campanha: Uuid = sqlx::query_scalar("INSERT INTO campanha (nome) VALUES ('Campanha') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
        let admin: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO profiles (nome_completo, telefone, senha_hash, roles, campanha_id, status)
            VALUES ('Admin', '61999990000', 'hash-original', ARRAY['admin'], $1, 'inativo')
            RETURNING id
            "#,
        )
        .bind(campanha)
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO convites (campanha_id, token, telefone, role, origem, expires_at)
            VALUES ($1, 'tok-eleitor', '61999990000', 'eleitor', 'app', NOW() + INTERVAL '1 day')
            "#,
        )
        .bind(campanha)
        .execute(&pool)
        .await
        .unwrap();

        let err = service(&pool)
            .confirmar(ConfirmarConvitePayload { token: "tok-eleitor".into(), senha: "outra-senha".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraintViolation(_)));

        let (hash, status, roles): (String, String, Vec<String>) =
            sqlx::query_as("SELECT senha_hash, status, roles FROM profiles WHERE id = $1")
                .bind(admin)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(hash, "hash-original");
        assert_eq!(status, "inativo");
        assert_eq!(roles, vec!["admin".to_string()]);

        let convite_status: String = sqlx::query_scalar("SELECT status::text FROM convites WHERE token = 'tok-eleitor'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(convite_status, "pendente");
    }

    #[test]
    fn admin_waits_for_onboarding() {
        assert_eq!(status_apos_confirmacao(Role::Admin), ConviteStatus::Aceito);
        assert_eq!(status_apos_confirmacao(Role::Lideranca), ConviteStatus::Usado);
        assert_eq!(status_apos_confirmacao(Role::Eleitor), ConviteStatus::Usado);
    }

    #[test]
    fn whatsapp_message_has_link_and_deadline() {
        let msg = mensagem_whatsapp("Maria", Role::Lideranca, "http://x/mobile/onboarding?token=abc", 48);
        assert!(msg.starts_with("Olá, Maria!"));
        assert!(msg.contains("como Liderança"));
        assert!(msg.contains("http://x/mobile/onboarding?token=abc"));
        assert!(msg.contains("48 horas"));
    }
}
