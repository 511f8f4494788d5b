// src/models/roles.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

// Papéis conhecidos. No banco ficam como TEXT[] em profiles.roles.
// A ordem de declaração é a ordem hierárquica (maior primeiro).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Masteradmin,
    Admin,
    Coordenador,
    Colaborador,
    Lideranca,
    Eleitor,
}

impl Role {
    pub const TODOS: [Role; 6] = [
        Role::Masteradmin,
        Role::Admin,
        Role::Coordenador,
        Role::Colaborador,
        Role::Lideranca,
        Role::Eleitor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Masteradmin => "masteradmin",
            Role::Admin => "admin",
            Role::Coordenador => "coordenador",
            Role::Colaborador => "colaborador",
            Role::Lideranca => "lideranca",
            Role::Eleitor => "eleitor",
        }
    }

    /// Rótulo em pt-BR para exibição.
    pub fn rotulo(&self) -> &'static str {
        match self {
            Role::Masteradmin => "Master Admin",
            Role::Admin => "Administrador",
            Role::Coordenador => "Coordenador",
            Role::Colaborador => "Colaborador",
            Role::Lideranca => "Liderança",
            Role::Eleitor => "Eleitor",
        }
    }

    /// Papéis que este papel pode convidar.
    pub fn convidaveis(&self) -> &'static [Role] {
        match self {
            Role::Masteradmin => &[
                Role::Admin,
                Role::Colaborador,
                Role::Coordenador,
                Role::Lideranca,
                Role::Eleitor,
            ],
            Role::Admin => &[Role::Colaborador, Role::Coordenador, Role::Lideranca, Role::Eleitor],
            Role::Coordenador => &[Role::Lideranca],
            Role::Lideranca => &[Role::Eleitor],
            Role::Colaborador | Role::Eleitor => &[],
        }
    }

    pub fn pode_convidar(&self, alvo: Role) -> bool {
        self.convidaveis().contains(&alvo)
    }

    /// Papéis que administram a campanha inteira (veem todos os convites, etc).
    pub fn is_gestor(&self) -> bool {
        matches!(self, Role::Masteradmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::TODOS
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Papel desconhecido: {}", s))
    }
}

/// Converte a coluna TEXT[] em papéis conhecidos, ignorando valores estranhos.
pub fn parse_roles(roles: &[String]) -> Vec<Role> {
    roles.iter().filter_map(|r| r.parse().ok()).collect()
}

/// O papel mais alto da lista (usado para redirecionamento no app).
pub fn papel_principal(roles: &[Role]) -> Option<Role> {
    roles.iter().min().copied()
}

/// Algum dos papéis do usuário permite convidar o alvo?
pub fn pode_convidar_algum(roles: &[Role], alvo: Role) -> bool {
    roles.iter().any(|r| r.pode_convidar(alvo))
}

#[derive(Debug, Serialize)]
pub struct OpcaoConvite {
    pub value: Role,
    pub label: &'static str,
}

/// Opções de convite formatadas para o select do frontend.
pub fn opcoes_convite(roles: &[Role]) -> Vec<OpcaoConvite> {
    let mut alvos: Vec<Role> = roles.iter().flat_map(|r| r.convidaveis().iter().copied()).collect();
    alvos.sort();
    alvos.dedup();
    alvos
        .into_iter()
        .map(|r| OpcaoConvite { value: r, label: r.rotulo() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_matches_table() {
        assert!(Role::Masteradmin.pode_convidar(Role::Admin));
        assert!(!Role::Admin.pode_convidar(Role::Admin));
        assert!(Role::Admin.pode_convidar(Role::Coordenador));
        assert!(Role::Admin.pode_convidar(Role::Eleitor));
        assert!(Role::Coordenador.pode_convidar(Role::Lideranca));
        assert!(!Role::Coordenador.pode_convidar(Role::Eleitor));
        assert!(Role::Lideranca.pode_convidar(Role::Eleitor));
        assert!(!Role::Lideranca.pode_convidar(Role::Lideranca));
        assert!(Role::Colaborador.convidaveis().is_empty());
        assert!(Role::Eleitor.convidaveis().is_empty());
    }

    #[test]
    fn nobody_invites_masteradmin() {
        for r in Role::TODOS {
            assert!(!r.pode_convidar(Role::Masteradmin));
        }
    }

    #[test]
    fn parse_and_principal() {
        let roles = parse_roles(&["lideranca".into(), "xyz".into(), "coordenador".into()]);
        assert_eq!(roles, vec![Role::Lideranca, Role::Coordenador]);
        assert_eq!(papel_principal(&roles), Some(Role::Coordenador));
        assert_eq!(papel_principal(&[]), None);
    }

    #[test]
    fn any_role_may_grant_invite() {
        let roles = [Role::Colaborador, Role::Lideranca];
        assert!(pode_convidar_algum(&roles, Role::Eleitor));
        assert!(!pode_convidar_algum(&roles, Role::Coordenador));
    }

    #[test]
    fn invite_options_are_deduplicated() {
        let opcoes = opcoes_convite(&[Role::Coordenador, Role::Lideranca, Role::Admin]);
        let valores: Vec<Role> = opcoes.iter().map(|o| o.value).collect();
        assert_eq!(
            valores,
            vec![Role::Coordenador, Role::Colaborador, Role::Lideranca, Role::Eleitor]
        );
        assert_eq!(opcoes[2].label, "Liderança");
    }
}
