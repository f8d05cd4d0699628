use super::Serializer;

use gridql_core::{Capability, CompileOptions, FieldLookup};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Flavor {
    Postgresql,
    Sqlite,
}

impl<'a> Serializer<'a> {
    pub fn sqlite(fields: &'a dyn FieldLookup) -> Serializer<'a> {
        Serializer {
            fields,
            flavor: Flavor::Sqlite,
            options: CompileOptions::default(),
        }
    }

    pub fn postgresql(fields: &'a dyn FieldLookup) -> Serializer<'a> {
        Serializer {
            fields,
            flavor: Flavor::Postgresql,
            options: CompileOptions::default(),
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.flavor == Flavor::Sqlite
    }

    pub fn is_postgresql(&self) -> bool {
        self.flavor == Flavor::Postgresql
    }

    pub fn capability(&self) -> &'static Capability {
        match self.flavor {
            Flavor::Postgresql => &Capability::POSTGRESQL,
            Flavor::Sqlite => &Capability::SQLITE,
        }
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Flavor::Postgresql => "postgresql",
            Flavor::Sqlite => "sqlite",
        })
    }
}
