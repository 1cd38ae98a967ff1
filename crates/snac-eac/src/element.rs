//! Closed table of recognized EAC-CPF elements
//!
//! The walker dispatches on [`EacElement`] with `match`, so adding a variant
//! here forces every dispatch site to decide what to do with it. Anything
//! not in the table becomes [`EacElement::Unrecognized`] and is ledgered.

use std::fmt::{self, Display, Formatter};

/// Local element names the walker understands
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EacElement {
    EacCpf,
    // control
    Control,
    RecordId,
    OtherRecordId,
    MaintenanceStatus,
    MaintenanceAgency,
    AgencyName,
    LanguageDeclaration,
    Language,
    Script,
    ConventionDeclaration,
    Citation,
    MaintenanceHistory,
    MaintenanceEvent,
    EventType,
    EventDateTime,
    AgentType,
    Agent,
    EventDescription,
    Sources,
    Source,
    SourceEntry,
    // cpfDescription
    CpfDescription,
    Identity,
    EntityType,
    NameEntry,
    Part,
    AlternativeForm,
    AuthorizedForm,
    UseDates,
    Description,
    ExistDates,
    DateSet,
    DateRange,
    FromDate,
    ToDate,
    Date,
    Place,
    PlaceEntry,
    PlaceRole,
    LocalDescription,
    Term,
    LanguageUsed,
    Occupation,
    Function,
    BiogHist,
    Relations,
    CpfRelation,
    ResourceRelation,
    RelationEntry,
    ObjectXmlWrap,
    // shared
    DescriptiveNote,
    Paragraph,
    /// Any other local name
    Unrecognized(String),
}

impl EacElement {
    /// Every recognized element, for table-coverage tests
    pub const KNOWN: [Self; 54] = [
        Self::EacCpf,
        Self::Control,
        Self::RecordId,
        Self::OtherRecordId,
        Self::MaintenanceStatus,
        Self::MaintenanceAgency,
        Self::AgencyName,
        Self::LanguageDeclaration,
        Self::Language,
        Self::Script,
        Self::ConventionDeclaration,
        Self::Citation,
        Self::MaintenanceHistory,
        Self::MaintenanceEvent,
        Self::EventType,
        Self::EventDateTime,
        Self::AgentType,
        Self::Agent,
        Self::EventDescription,
        Self::Sources,
        Self::Source,
        Self::SourceEntry,
        Self::CpfDescription,
        Self::Identity,
        Self::EntityType,
        Self::NameEntry,
        Self::Part,
        Self::AlternativeForm,
        Self::AuthorizedForm,
        Self::UseDates,
        Self::Description,
        Self::ExistDates,
        Self::DateSet,
        Self::DateRange,
        Self::FromDate,
        Self::ToDate,
        Self::Date,
        Self::Place,
        Self::PlaceEntry,
        Self::PlaceRole,
        Self::LocalDescription,
        Self::Term,
        Self::LanguageUsed,
        Self::Occupation,
        Self::Function,
        Self::BiogHist,
        Self::Relations,
        Self::CpfRelation,
        Self::ResourceRelation,
        Self::RelationEntry,
        Self::ObjectXmlWrap,
        Self::DescriptiveNote,
        Self::Paragraph,
        Self::Unrecognized(String::new()),
    ];

    /// Classify a local name
    #[must_use]
    pub fn from_local_name(name: &str) -> Self {
        match name {
            "eac-cpf" => Self::EacCpf,
            "control" => Self::Control,
            "recordId" => Self::RecordId,
            "otherRecordId" => Self::OtherRecordId,
            "maintenanceStatus" => Self::MaintenanceStatus,
            "maintenanceAgency" => Self::MaintenanceAgency,
            "agencyName" => Self::AgencyName,
            "languageDeclaration" => Self::LanguageDeclaration,
            "language" => Self::Language,
            "script" => Self::Script,
            "conventionDeclaration" => Self::ConventionDeclaration,
            "citation" => Self::Citation,
            "maintenanceHistory" => Self::MaintenanceHistory,
            "maintenanceEvent" => Self::MaintenanceEvent,
            "eventType" => Self::EventType,
            "eventDateTime" => Self::EventDateTime,
            "agentType" => Self::AgentType,
            "agent" => Self::Agent,
            "eventDescription" => Self::EventDescription,
            "sources" => Self::Sources,
            "source" => Self::Source,
            "sourceEntry" => Self::SourceEntry,
            "cpfDescription" => Self::CpfDescription,
            "identity" => Self::Identity,
            "entityType" => Self::EntityType,
            "nameEntry" => Self::NameEntry,
            "part" => Self::Part,
            "alternativeForm" => Self::AlternativeForm,
            "authorizedForm" => Self::AuthorizedForm,
            "useDates" => Self::UseDates,
            "description" => Self::Description,
            "existDates" => Self::ExistDates,
            "dateSet" => Self::DateSet,
            "dateRange" => Self::DateRange,
            "fromDate" => Self::FromDate,
            "toDate" => Self::ToDate,
            "date" => Self::Date,
            "place" => Self::Place,
            "placeEntry" => Self::PlaceEntry,
            "placeRole" => Self::PlaceRole,
            "localDescription" => Self::LocalDescription,
            "term" => Self::Term,
            "languageUsed" => Self::LanguageUsed,
            "occupation" => Self::Occupation,
            "function" => Self::Function,
            "biogHist" => Self::BiogHist,
            "relations" => Self::Relations,
            "cpfRelation" => Self::CpfRelation,
            "resourceRelation" => Self::ResourceRelation,
            "relationEntry" => Self::RelationEntry,
            "objectXMLWrap" => Self::ObjectXmlWrap,
            "descriptiveNote" => Self::DescriptiveNote,
            "p" => Self::Paragraph,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Local name as written in documents
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::EacCpf => "eac-cpf",
            Self::Control => "control",
            Self::RecordId => "recordId",
            Self::OtherRecordId => "otherRecordId",
            Self::MaintenanceStatus => "maintenanceStatus",
            Self::MaintenanceAgency => "maintenanceAgency",
            Self::AgencyName => "agencyName",
            Self::LanguageDeclaration => "languageDeclaration",
            Self::Language => "language",
            Self::Script => "script",
            Self::ConventionDeclaration => "conventionDeclaration",
            Self::Citation => "citation",
            Self::MaintenanceHistory => "maintenanceHistory",
            Self::MaintenanceEvent => "maintenanceEvent",
            Self::EventType => "eventType",
            Self::EventDateTime => "eventDateTime",
            Self::AgentType => "agentType",
            Self::Agent => "agent",
            Self::EventDescription => "eventDescription",
            Self::Sources => "sources",
            Self::Source => "source",
            Self::SourceEntry => "sourceEntry",
            Self::CpfDescription => "cpfDescription",
            Self::Identity => "identity",
            Self::EntityType => "entityType",
            Self::NameEntry => "nameEntry",
            Self::Part => "part",
            Self::AlternativeForm => "alternativeForm",
            Self::AuthorizedForm => "authorizedForm",
            Self::UseDates => "useDates",
            Self::Description => "description",
            Self::ExistDates => "existDates",
            Self::DateSet => "dateSet",
            Self::DateRange => "dateRange",
            Self::FromDate => "fromDate",
            Self::ToDate => "toDate",
            Self::Date => "date",
            Self::Place => "place",
            Self::PlaceEntry => "placeEntry",
            Self::PlaceRole => "placeRole",
            Self::LocalDescription => "localDescription",
            Self::Term => "term",
            Self::LanguageUsed => "languageUsed",
            Self::Occupation => "occupation",
            Self::Function => "function",
            Self::BiogHist => "biogHist",
            Self::Relations => "relations",
            Self::CpfRelation => "cpfRelation",
            Self::ResourceRelation => "resourceRelation",
            Self::RelationEntry => "relationEntry",
            Self::ObjectXmlWrap => "objectXMLWrap",
            Self::DescriptiveNote => "descriptiveNote",
            Self::Paragraph => "p",
            Self::Unrecognized(name) => name,
        }
    }
}

impl Display for EacElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
