//! Catalogue of list-backed resources.
//!
//! Each resource knows its backend path segment, its default ordering, the
//! columns a list view may sort by, and which other resources show derived
//! data (and therefore go stale when it changes).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::query::{self, Filter, ListQuery, QueryKey, SortDirection, SortSpec};
use crate::types::Count;

/// A resource collection exposed by the backend as a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Pacientes,
    Planos,
    Procedimentos,
    Mapeamentos,
    /// Files kept in the managed storage bucket.
    Arquivos,
    Divergencias,
    Carteirinhas,
    Agendamentos,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Pacientes,
        Resource::Planos,
        Resource::Procedimentos,
        Resource::Mapeamentos,
        Resource::Arquivos,
        Resource::Divergencias,
        Resource::Carteirinhas,
        Resource::Agendamentos,
    ];

    /// Path segment and cache-key prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Pacientes => "pacientes",
            Resource::Planos => "planos",
            Resource::Procedimentos => "procedimentos",
            Resource::Mapeamentos => "mapeamentos",
            Resource::Arquivos => "arquivos",
            Resource::Divergencias => "divergencias",
            Resource::Carteirinhas => "carteirinhas",
            Resource::Agendamentos => "agendamentos",
        }
    }

    /// Columns a list view may order by.
    pub fn sortable_columns(self) -> &'static [&'static str] {
        match self {
            Resource::Pacientes => &["nome", "cpf", "data_nascimento", "created_at"],
            Resource::Planos => &["nome", "codigo", "created_at"],
            Resource::Procedimentos => &["codigo", "nome", "valor", "created_at"],
            Resource::Mapeamentos => &["codigo_origem", "codigo_destino", "created_at"],
            Resource::Arquivos => &["nome", "tamanho", "created_at"],
            Resource::Divergencias => &["data_execucao", "tipo", "status", "created_at"],
            Resource::Carteirinhas => &["numero", "paciente_nome", "validade", "created_at"],
            Resource::Agendamentos => &["data_agendamento", "paciente_nome", "status"],
        }
    }

    pub fn default_sort(self) -> SortSpec {
        match self {
            Resource::Pacientes | Resource::Planos => SortSpec::asc("nome"),
            Resource::Procedimentos => SortSpec::asc("codigo"),
            Resource::Mapeamentos | Resource::Arquivos => SortSpec::desc("created_at"),
            Resource::Divergencias => SortSpec::desc("data_execucao"),
            Resource::Carteirinhas => SortSpec::asc("numero"),
            Resource::Agendamentos => SortSpec::asc("data_agendamento"),
        }
    }

    /// Resources whose cached pages embed data from this one.
    pub fn dependents(self) -> &'static [Resource] {
        match self {
            Resource::Pacientes => &[Resource::Carteirinhas, Resource::Agendamentos],
            Resource::Planos => &[Resource::Carteirinhas],
            Resource::Procedimentos => &[Resource::Mapeamentos, Resource::Divergencias],
            Resource::Carteirinhas => &[Resource::Pacientes],
            Resource::Mapeamentos
            | Resource::Arquivos
            | Resource::Divergencias
            | Resource::Agendamentos => &[],
        }
    }

    /// Validate a sort request against this resource's sortable columns.
    pub fn sort(self, column: &str, direction: &str) -> CoreResult<SortSpec> {
        let spec = query::normalize_sort(column, direction)?;
        if !self.sortable_columns().contains(&spec.column.as_str()) {
            return Err(CoreError::InvalidArgument(format!(
                "'{}' cannot be sorted by '{}'",
                self, spec.column
            )));
        }
        Ok(spec)
    }

    /// A query for `page` with the resource's default ordering.
    pub fn query(self, page: Count, limit: Count) -> CoreResult<ListQuery> {
        ListQuery::new(page, limit, self.default_sort())
    }

    /// Cache key for one page of this resource.
    pub fn key(self, query: &ListQuery, filters: &[Filter]) -> QueryKey {
        query::build_key(self.as_str(), query, filters)
    }

    /// Sort for a click on `column`: reverses the direction when it is
    /// already the sort column, otherwise starts ascending.
    pub fn toggle_sort(self, current: &ListQuery, column: &str) -> CoreResult<SortSpec> {
        let direction = if current.order_column() == column {
            current.order_direction().reversed()
        } else {
            SortDirection::Asc
        };
        self.sort(column, direction.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CoreError::InvalidArgument(format!("unknown resource '{s}'")))
    }
}

impl AsRef<str> for Resource {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
