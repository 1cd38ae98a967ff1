//! Emission templates
//!
//! Maps every emittable graph field to the element path it is written at.
//! The serializer asks the table for each non-null field before writing it;
//! a field with no entry is an error rather than a silent drop.

use crate::error::SerializeError;
use snac_model::ElementPath;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Base of the SNAC control vocabulary URIs
pub const SNAC_TERM_BASE: &str = "http://socialarchive.iath.virginia.edu/control/term#";

/// Graph field that produces output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Ark,
    OtherRecordId,
    MaintenanceStatus,
    MaintenanceAgency,
    LanguageDeclaration,
    ConventionDeclaration,
    MaintenanceEvent,
    Source,
    EntityType,
    NameEntry,
    NameContributor,
    UseDates,
    ExistDates,
    Place,
    Subject,
    Nationality,
    Gender,
    LanguageUsed,
    Occupation,
    Function,
    BiogHist,
    Relation,
    ResourceRelation,
}

impl FieldPath {
    /// Every field, in emission order
    pub const ALL: [Self; 23] = [
        Self::Ark,
        Self::OtherRecordId,
        Self::MaintenanceStatus,
        Self::MaintenanceAgency,
        Self::LanguageDeclaration,
        Self::ConventionDeclaration,
        Self::MaintenanceEvent,
        Self::Source,
        Self::EntityType,
        Self::NameEntry,
        Self::NameContributor,
        Self::UseDates,
        Self::ExistDates,
        Self::Place,
        Self::Subject,
        Self::Nationality,
        Self::Gender,
        Self::LanguageUsed,
        Self::Occupation,
        Self::Function,
        Self::BiogHist,
        Self::Relation,
        Self::ResourceRelation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ark => "ark",
            Self::OtherRecordId => "otherRecordId",
            Self::MaintenanceStatus => "maintenanceStatus",
            Self::MaintenanceAgency => "maintenanceAgency",
            Self::LanguageDeclaration => "languageDeclaration",
            Self::ConventionDeclaration => "conventionDeclaration",
            Self::MaintenanceEvent => "maintenanceEvent",
            Self::Source => "source",
            Self::EntityType => "entityType",
            Self::NameEntry => "nameEntry",
            Self::NameContributor => "nameContributor",
            Self::UseDates => "useDates",
            Self::ExistDates => "existDates",
            Self::Place => "place",
            Self::Subject => "subject",
            Self::Nationality => "nationality",
            Self::Gender => "gender",
            Self::LanguageUsed => "languageUsed",
            Self::Occupation => "occupation",
            Self::Function => "function",
            Self::BiogHist => "biogHist",
            Self::Relation => "relation",
            Self::ResourceRelation => "resourceRelation",
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how one field is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTemplate {
    /// Element path from the document root
    pub path: ElementPath,
    /// `localType` keyword URI written on the element, if any
    pub local_type: Option<String>,
}

impl ElementTemplate {
    fn at(path: &str) -> Self {
        Self {
            path: ElementPath::from(path.split('/').map(str::to_string).collect::<Vec<_>>()),
            local_type: None,
        }
    }

    fn typed(path: &str, keyword: &str) -> Self {
        Self {
            local_type: Some(format!("{SNAC_TERM_BASE}{keyword}")),
            ..Self::at(path)
        }
    }

    /// Name of the element the field produces
    #[must_use]
    pub fn element(&self) -> &str {
        self.path.last().unwrap_or_default()
    }
}

/// Field → template lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTable {
    entries: HashMap<FieldPath, ElementTemplate>,
}

impl TemplateTable {
    /// Empty table
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Standard EAC-CPF layout
    #[must_use]
    pub fn eac_cpf() -> Self {
        const DESCRIPTION: &str = "eac-cpf/cpfDescription/description";
        let mut table = Self::empty();
        for (field, template) in [
            (FieldPath::Ark, ElementTemplate::at("eac-cpf/control/recordId")),
            (FieldPath::OtherRecordId, ElementTemplate::at("eac-cpf/control/otherRecordId")),
            (
                FieldPath::MaintenanceStatus,
                ElementTemplate::at("eac-cpf/control/maintenanceStatus"),
            ),
            (
                FieldPath::MaintenanceAgency,
                ElementTemplate::at("eac-cpf/control/maintenanceAgency/agencyName"),
            ),
            (
                FieldPath::LanguageDeclaration,
                ElementTemplate::at("eac-cpf/control/languageDeclaration"),
            ),
            (
                FieldPath::ConventionDeclaration,
                ElementTemplate::at("eac-cpf/control/conventionDeclaration"),
            ),
            (
                FieldPath::MaintenanceEvent,
                ElementTemplate::at("eac-cpf/control/maintenanceHistory/maintenanceEvent"),
            ),
            (FieldPath::Source, ElementTemplate::at("eac-cpf/control/sources/source")),
            (
                FieldPath::EntityType,
                ElementTemplate::at("eac-cpf/cpfDescription/identity/entityType"),
            ),
            (
                FieldPath::NameEntry,
                ElementTemplate::at("eac-cpf/cpfDescription/identity/nameEntry"),
            ),
            (
                FieldPath::NameContributor,
                ElementTemplate::at("eac-cpf/cpfDescription/identity/nameEntry/alternativeForm"),
            ),
            (
                FieldPath::UseDates,
                ElementTemplate::at("eac-cpf/cpfDescription/identity/nameEntry/useDates"),
            ),
            (FieldPath::ExistDates, ElementTemplate::at(&format!("{DESCRIPTION}/existDates"))),
            (FieldPath::Place, ElementTemplate::at(&format!("{DESCRIPTION}/place"))),
            (
                FieldPath::Subject,
                ElementTemplate::typed(&format!("{DESCRIPTION}/localDescription"), "AssociatedSubject"),
            ),
            (
                FieldPath::Nationality,
                ElementTemplate::typed(&format!("{DESCRIPTION}/localDescription"), "nationalityOfEntity"),
            ),
            (
                FieldPath::Gender,
                ElementTemplate::typed(&format!("{DESCRIPTION}/localDescription"), "gender"),
            ),
            (FieldPath::LanguageUsed, ElementTemplate::at(&format!("{DESCRIPTION}/languageUsed"))),
            (FieldPath::Occupation, ElementTemplate::at(&format!("{DESCRIPTION}/occupation"))),
            (FieldPath::Function, ElementTemplate::at(&format!("{DESCRIPTION}/function"))),
            (FieldPath::BiogHist, ElementTemplate::at(&format!("{DESCRIPTION}/biogHist"))),
            (
                FieldPath::Relation,
                ElementTemplate::at("eac-cpf/cpfDescription/relations/cpfRelation"),
            ),
            (
                FieldPath::ResourceRelation,
                ElementTemplate::at("eac-cpf/cpfDescription/relations/resourceRelation"),
            ),
        ] {
            table.insert(field, template);
        }
        table
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, field: FieldPath, template: ElementTemplate) {
        self.entries.insert(field, template);
    }

    /// Drop a mapping
    #[must_use]
    pub fn without(mut self, field: FieldPath) -> Self {
        self.entries.remove(&field);
        self
    }

    /// Template for `field`
    ///
    /// # Errors
    /// `SerializeError::MissingTemplate` if the table has no entry
    pub fn get(&self, field: FieldPath) -> Result<&ElementTemplate, SerializeError> {
        self.entries
            .get(&field)
            .ok_or(SerializeError::MissingTemplate(field))
    }

    /// Fields with no mapping
    #[must_use]
    pub fn missing(&self) -> Vec<FieldPath> {
        FieldPath::ALL
            .into_iter()
            .filter(|f| !self.entries.contains_key(f))
            .collect()
    }
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::eac_cpf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_field() {
        assert!(TemplateTable::default().missing().is_empty());
    }

    #[test]
    fn element_names_follow_paths() {
        let table = TemplateTable::default();
        assert_eq!(table.get(FieldPath::Ark).unwrap().element(), "recordId");
        assert_eq!(table.get(FieldPath::MaintenanceAgency).unwrap().element(), "agencyName");
        let gender = table.get(FieldPath::Gender).unwrap();
        assert_eq!(gender.element(), "localDescription");
        assert_eq!(
            gender.local_type.as_deref(),
            Some("http://socialarchive.iath.virginia.edu/control/term#gender")
        );
    }

    #[test]
    fn missing_mapping_is_an_error() {
        let table = TemplateTable::default().without(FieldPath::BiogHist);
        assert_eq!(table.missing(), vec![FieldPath::BiogHist]);
        let err = table.get(FieldPath::BiogHist).unwrap_err();
        assert_eq!(err.to_string(), "no template for field 'biogHist'");
    }
}
