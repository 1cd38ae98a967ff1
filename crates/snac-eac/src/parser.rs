//! EAC-CPF walker
//!
//! Turns a namespace-erased [`XmlDocument`] into a [`Constellation`] in one
//! depth-first pass. Each element handler consumes the attributes and child
//! elements it understands; whatever is left over goes into the [`Ledger`]
//! under the path of the element that carried it. Nothing is dropped
//! silently.
//!
//! The walker never fails on unexpected *content*. Only markup that is not
//! well-formed is an error, and that is raised before the walk starts.

use crate::element::EacElement;
use crate::error::ParseError;
use crate::ledger::Ledger;
use crate::tree::{XmlDocument, XmlElement, DEFAULT_MAX_DEPTH};
use snac_model::{
    BiogHist, Constellation, ConstellationRelation, ConventionDeclaration, DatePoint,
    DescriptiveKind, Diagnostic, DiagnosticsSink, ElementPath, Language, Level,
    LocalVocabulary, MaintenanceEvent, NameContributor, NameEntry, Place, Resource,
    ResourceRelation, SameAs, SharedSink, SnacDate, Source, Stage, Term, TermNode,
    TracingSink, VocabularyLookup, VocabularyType,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Walker with its collaborators
#[derive(Clone)]
pub struct EacParser {
    vocabulary: Arc<dyn VocabularyLookup>,
    sink: SharedSink,
    max_depth: usize,
}

impl EacParser {
    /// Create walker with injected collaborators
    #[must_use]
    pub fn new(vocabulary: Arc<dyn VocabularyLookup>, sink: SharedSink) -> Self {
        Self {
            vocabulary,
            sink,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// With nesting limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walker resolving terms locally and logging through `tracing`
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(LocalVocabulary::new()), TracingSink::shared())
    }

    /// Parse EAC-CPF bytes
    ///
    /// # Errors
    /// - `ParseError::MalformedMarkup` if the bytes are not well-formed XML;
    ///   no partial graph is returned
    /// - `ParseError::TooDeep` past the nesting limit
    pub fn parse(&self, bytes: &[u8]) -> Result<(Constellation, Ledger), ParseError> {
        let doc = XmlDocument::parse_with_depth(bytes, self.max_depth)?;
        Ok(self.walk(&doc))
    }

    /// Walk an already flattened document
    #[must_use]
    pub fn walk(&self, doc: &XmlDocument) -> (Constellation, Ledger) {
        let mut walk = Walk {
            doc,
            vocabulary: self.vocabulary.as_ref(),
            sink: self.sink.as_ref(),
            ledger: Ledger::new(),
            graph: Constellation::new(),
        };
        let root = &doc.root;
        let root_path = ElementPath::single(&root.name);
        match EacElement::from_local_name(&root.name) {
            EacElement::EacCpf => walk.root(root, &root_path),
            _ => {
                walk.sink.warn(
                    Stage::Parse,
                    &format!("root element <{}> is not eac-cpf", root.name),
                );
                walk.unknown(root, &root_path);
            }
        }
        walk.sink.info(
            Stage::Parse,
            &format!(
                "parsed {} node(s), {} unmapped construct(s)",
                walk.graph.node_count(),
                walk.ledger.len()
            ),
        );
        (walk.graph, walk.ledger)
    }
}

impl Default for EacParser {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for EacParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EacParser")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// Attribute consumption tracker for one element
struct Attrs<'e> {
    el: &'e XmlElement,
    used: Vec<bool>,
}

impl<'e> Attrs<'e> {
    fn new(el: &'e XmlElement) -> Self {
        Self {
            el,
            used: vec![false; el.attributes.len()],
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.el
            .attributes
            .iter()
            .enumerate()
            .position(|(i, (k, _))| !self.used[i] && k == name)
    }

    /// Consume an attribute; a blank value is left for the ledger
    fn take(&mut self, name: &str) -> Option<&'e str> {
        let i = self.position(name)?;
        let value = self.el.attributes[i].1.trim();
        if value.is_empty() {
            return None;
        }
        self.used[i] = true;
        Some(value)
    }

    /// Consume an attribute only if it parses
    fn take_parsed<T: FromStr>(&mut self, name: &str) -> Option<T> {
        let i = self.position(name)?;
        let parsed = self.el.attributes[i].1.trim().parse().ok()?;
        self.used[i] = true;
        Some(parsed)
    }

    fn remaining(&self) -> impl Iterator<Item = &'e (String, String)> + '_ {
        self.el
            .attributes
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.used[*i])
            .map(|(_, attr)| attr)
    }
}

struct Walk<'d> {
    doc: &'d XmlDocument,
    vocabulary: &'d dyn VocabularyLookup,
    sink: &'d dyn DiagnosticsSink,
    ledger: Ledger,
    graph: Constellation,
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

impl<'d> Walk<'d> {
    // ---- ledger plumbing ---------------------------------------------------

    fn unknown(&mut self, el: &XmlElement, path: &ElementPath) {
        self.sink.emit(
            Diagnostic::new(Stage::Parse, Level::Debug, format!("unmapped element <{}>", el.name))
                .at(path.to_string()),
        );
        self.ledger
            .record(path.clone(), &el.name, self.doc.raw(el), false);
    }

    fn residual(&mut self, attrs: &Attrs<'_>, path: &ElementPath) {
        for (name, value) in attrs.remaining() {
            self.sink.emit(
                Diagnostic::new(Stage::Parse, Level::Debug, format!("unmapped attribute @{name}"))
                    .at(path.to_string()),
            );
            self.ledger.record(path.clone(), name, value, true);
        }
    }

    /// Text of a leaf element; stray children and attributes are ledgered
    fn leaf(&mut self, el: &XmlElement, path: &ElementPath, attrs: &Attrs<'_>) -> Option<String> {
        self.residual(attrs, path);
        for child in el.elements() {
            self.unknown(child, &path.child(&child.name));
        }
        non_empty(el.text())
    }

    fn plain_leaf(&mut self, el: &XmlElement, path: &ElementPath) -> Option<String> {
        self.leaf(el, path, &Attrs::new(el))
    }

    /// Text of a leaf whose text is its value; without any, the element is
    /// ledgered whole
    fn required_leaf(
        &mut self,
        el: &XmlElement,
        path: &ElementPath,
        attrs: &Attrs<'_>,
    ) -> Option<String> {
        if el.text().is_empty() {
            self.unknown(el, path);
            return None;
        }
        self.leaf(el, path, attrs)
    }

    fn required_plain_leaf(&mut self, el: &XmlElement, path: &ElementPath) -> Option<String> {
        self.required_leaf(el, path, &Attrs::new(el))
    }

    /// Ledger `el` whole unless it has a child named `kind`
    fn requires_child(&mut self, el: &XmlElement, path: &ElementPath, kind: EacElement) -> bool {
        let found = el
            .elements()
            .any(|c| EacElement::from_local_name(&c.name) == kind);
        if !found {
            self.unknown(el, path);
        }
        found
    }

    /// Flattened text of a `descriptiveNote`'s paragraphs
    fn note(&mut self, el: &XmlElement, path: &ElementPath) -> Option<String> {
        if el.deep_text().is_empty() {
            self.unknown(el, path);
            return None;
        }
        self.residual(&Attrs::new(el), path);
        let mut parts = Vec::new();
        let direct = el.text();
        if !direct.is_empty() {
            parts.push(direct);
        }
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Paragraph => {
                    self.residual(&Attrs::new(child), &child_path);
                    let text = child.deep_text();
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
                _ => self.unknown(child, &child_path),
            }
        }
        non_empty(parts.join(" "))
    }

    fn term(&self, value: Option<&str>, vocabulary: VocabularyType) -> Option<Term> {
        let value = value?.trim();
        (!value.is_empty()).then(|| self.vocabulary.resolve_term(value, vocabulary))
    }

    fn term_text(&self, value: Option<String>, vocabulary: VocabularyType) -> Option<Term> {
        self.term(value.as_deref(), vocabulary)
    }

    // ---- top level ---------------------------------------------------------

    fn root(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Control => self.control(child, &child_path),
                EacElement::CpfDescription => self.cpf_description(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
    }

    // ---- control -----------------------------------------------------------

    fn control(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::RecordId => {
                    self.graph.ark = self.required_plain_leaf(child, &child_path);
                }
                EacElement::OtherRecordId => {
                    let mut attrs = Attrs::new(child);
                    let record_type = self.term(attrs.take("localType"), VocabularyType::RecordType);
                    if let Some(text) = self.required_leaf(child, &child_path, &attrs) {
                        self.graph.other_record_ids.push(SameAs {
                            record_type,
                            uri: text.clone(),
                            text: Some(text),
                            ..SameAs::default()
                        });
                    }
                }
                EacElement::MaintenanceStatus => {
                    let text = self.required_plain_leaf(child, &child_path);
                    self.graph.maintenance_status =
                        self.term_text(text, VocabularyType::MaintenanceStatus);
                }
                EacElement::MaintenanceAgency => self.maintenance_agency(child, &child_path),
                EacElement::LanguageDeclaration => {
                    self.graph.language_declaration = Some(self.language(child, &child_path));
                }
                EacElement::ConventionDeclaration => {
                    self.convention_declaration(child, &child_path);
                }
                EacElement::MaintenanceHistory => self.maintenance_history(child, &child_path),
                EacElement::Sources => self.sources(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
    }

    /// The first `agencyName` names the agency; any other child is unmapped
    fn maintenance_agency(&mut self, el: &XmlElement, path: &ElementPath) {
        let has_children = el.elements().next().is_some();
        if !has_children && el.text().is_empty() {
            self.unknown(el, path);
            return;
        }
        self.residual(&Attrs::new(el), path);
        if !has_children {
            self.graph.maintenance_agency = non_empty(el.text());
            return;
        }
        let mut seen = false;
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::AgencyName if !seen => {
                    seen = true;
                    self.graph.maintenance_agency = self.required_plain_leaf(child, &child_path);
                }
                _ => self.unknown(child, &child_path),
            }
        }
    }

    /// `languageDeclaration` and `languageUsed` share one shape
    fn language(&mut self, el: &XmlElement, path: &ElementPath) -> Language {
        self.residual(&Attrs::new(el), path);
        let mut language = Language::default();
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Language => {
                    let mut attrs = Attrs::new(child);
                    language.language =
                        self.term(attrs.take("languageCode"), VocabularyType::LanguageCode);
                    language.language_name = self.leaf(child, &child_path, &attrs);
                }
                EacElement::Script => {
                    let mut attrs = Attrs::new(child);
                    language.script =
                        self.term(attrs.take("scriptCode"), VocabularyType::ScriptCode);
                    language.script_name = self.leaf(child, &child_path, &attrs);
                }
                _ => self.unknown(child, &child_path),
            }
        }
        language
    }

    fn convention_declaration(&mut self, el: &XmlElement, path: &ElementPath) {
        if !self.requires_child(el, path, EacElement::Citation) {
            return;
        }
        self.residual(&Attrs::new(el), path);
        let mut citation = None;
        let mut seen = false;
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Citation if !seen => {
                    seen = true;
                    citation = self.required_plain_leaf(child, &child_path);
                }
                _ => self.unknown(child, &child_path),
            }
        }
        if let Some(citation) = citation {
            self.graph
                .convention_declarations
                .push(ConventionDeclaration {
                    citation,
                    ..ConventionDeclaration::default()
                });
        }
    }

    fn maintenance_history(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::MaintenanceEvent => {
                    let event = self.maintenance_event(child, &child_path);
                    self.graph.maintenance_events.push(event);
                }
                _ => self.unknown(child, &child_path),
            }
        }
    }

    fn maintenance_event(&mut self, el: &XmlElement, path: &ElementPath) -> MaintenanceEvent {
        self.residual(&Attrs::new(el), path);
        let mut event = MaintenanceEvent::default();
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::EventType => {
                    let text = self.plain_leaf(child, &child_path);
                    event.event_type = self.term_text(text, VocabularyType::EventType);
                }
                EacElement::EventDateTime => {
                    let mut attrs = Attrs::new(child);
                    event.standard_date_time = attrs.take("standardDateTime").map(str::to_string);
                    event.event_date_time = self.leaf(child, &child_path, &attrs);
                }
                EacElement::AgentType => {
                    let text = self.plain_leaf(child, &child_path);
                    event.agent_type = self.term_text(text, VocabularyType::AgentType);
                }
                EacElement::Agent => event.agent = self.plain_leaf(child, &child_path),
                EacElement::EventDescription => {
                    event.event_description = self.plain_leaf(child, &child_path);
                }
                _ => self.unknown(child, &child_path),
            }
        }
        event
    }

    fn sources(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Source => {
                    let source = self.source(child, &child_path);
                    self.graph.sources.push(source);
                }
                _ => self.unknown(child, &child_path),
            }
        }
    }

    fn source(&mut self, el: &XmlElement, path: &ElementPath) -> Source {
        let mut attrs = Attrs::new(el);
        let mut source = Source {
            source_type: self.term(attrs.take("type"), VocabularyType::SourceType),
            uri: attrs.take("href").map(str::to_string),
            ..Source::default()
        };
        self.residual(&attrs, path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::SourceEntry => {
                    source.display_name = self.required_plain_leaf(child, &child_path);
                }
                EacElement::DescriptiveNote => source.note = self.note(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
        source
    }

    // ---- cpfDescription ----------------------------------------------------

    fn cpf_description(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Identity => self.identity(child, &child_path),
                EacElement::Description => self.description(child, &child_path),
                EacElement::Relations => self.relations(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
    }

    fn identity(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::EntityType => {
                    let text = self.required_plain_leaf(child, &child_path);
                    self.graph.entity_type = self.term_text(text, VocabularyType::EntityType);
                }
                EacElement::NameEntry => {
                    let entry = self.name_entry(child, &child_path);
                    self.graph.name_entries.push(entry);
                }
                _ => self.unknown(child, &child_path),
            }
        }
    }

    fn name_entry(&mut self, el: &XmlElement, path: &ElementPath) -> NameEntry {
        let mut attrs = Attrs::new(el);
        let mut entry = NameEntry::new("", attrs.take_parsed::<f64>("preferenceScore"));
        if let Some(code) = self.term(attrs.take("lang"), VocabularyType::LanguageCode) {
            entry.language = Some(Language {
                language: Some(code),
                ..Language::default()
            });
        }
        self.residual(&attrs, path);

        let mut has_part = false;
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Part if !has_part => {
                    has_part = true;
                    entry.original = self.plain_leaf(child, &child_path).unwrap_or_default();
                }
                kind @ (EacElement::AlternativeForm | EacElement::AuthorizedForm) => {
                    if let Some(name) = self.required_plain_leaf(child, &child_path) {
                        entry.contributors.push(NameContributor {
                            contributor_type: self
                                .term(Some(kind.as_str()), VocabularyType::NameComponent),
                            name,
                            ..NameContributor::default()
                        });
                    }
                }
                EacElement::UseDates => {
                    self.residual(&Attrs::new(child), &child_path);
                    entry.use_dates = self.dates(child, &child_path);
                }
                _ => self.unknown(child, &child_path),
            }
        }
        entry
    }

    fn description(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::ExistDates => self.exist_dates(child, &child_path),
                EacElement::Place => {
                    let place = self.place(child, &child_path);
                    self.graph.places.push(place);
                }
                EacElement::LocalDescription => self.local_description(child, &child_path),
                EacElement::LanguageUsed => {
                    let language = self.language(child, &child_path);
                    self.graph.languages_used.push(language);
                }
                EacElement::Occupation => {
                    if let Some(node) = self.term_node(child, &child_path, DescriptiveKind::Occupation) {
                        self.graph.occupations.push(node);
                    }
                }
                EacElement::Function => {
                    if let Some(node) = self.term_node(child, &child_path, DescriptiveKind::Function) {
                        self.graph.functions.push(node);
                    }
                }
                EacElement::BiogHist => {
                    let mut attrs = Attrs::new(child);
                    let language = self
                        .term(attrs.take("lang"), VocabularyType::LanguageCode)
                        .map(|code| Language {
                            language: Some(code),
                            ..Language::default()
                        });
                    // Attributes survive verbatim in the fragment itself
                    self.graph.biog_hists.push(BiogHist {
                        text: self.doc.fragment(child).into_owned(),
                        language,
                        ..BiogHist::default()
                    });
                }
                _ => self.unknown(child, &child_path),
            }
        }
    }

    fn exist_dates(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        let mut dates = Vec::new();
        let mut note = None;
        for child in el.elements() {
            let child_path = path.child(&child.name);
            if EacElement::from_local_name(&child.name) == EacElement::DescriptiveNote {
                note = self.note(child, &child_path);
            } else if !self.date_child(child, &child_path, &mut dates) {
                self.unknown(child, &child_path);
            }
        }
        for date in &mut dates {
            date.note.clone_from(&note);
        }
        self.graph.exist_dates.extend(dates);
    }

    /// `date`, `dateRange` and `dateSet` children of `el`
    fn dates(&mut self, el: &XmlElement, path: &ElementPath) -> Vec<SnacDate> {
        let mut dates = Vec::new();
        for child in el.elements() {
            let child_path = path.child(&child.name);
            if !self.date_child(child, &child_path, &mut dates) {
                self.unknown(child, &child_path);
            }
        }
        dates
    }

    /// Collect one date-bearing element into `out`; false if it carries none
    fn date_child(
        &mut self,
        child: &XmlElement,
        path: &ElementPath,
        out: &mut Vec<SnacDate>,
    ) -> bool {
        match EacElement::from_local_name(&child.name) {
            EacElement::Date => out.push(self.single_date(child, path)),
            EacElement::DateRange => out.push(self.date_range(child, path)),
            EacElement::DateSet => {
                self.residual(&Attrs::new(child), path);
                let nested = self.dates(child, path);
                out.extend(nested);
            }
            _ => return false,
        }
        true
    }

    fn date_point(&mut self, el: &XmlElement, path: &ElementPath) -> DatePoint {
        let mut attrs = Attrs::new(el);
        let mut point = DatePoint::default();
        if let Some(standard) = attrs.take("standardDate") {
            point.set_standard(standard);
        }
        point.date_type = self.term(attrs.take("localType"), VocabularyType::DateType);
        point.fuzzy.not_before = attrs.take("notBefore").map(str::to_string);
        point.fuzzy.not_after = attrs.take("notAfter").map(str::to_string);
        point.original = self.leaf(el, path, &attrs);
        point
    }

    fn single_date(&mut self, el: &XmlElement, path: &ElementPath) -> SnacDate {
        SnacDate {
            from: self.date_point(el, path),
            ..SnacDate::default()
        }
    }

    fn date_range(&mut self, el: &XmlElement, path: &ElementPath) -> SnacDate {
        self.residual(&Attrs::new(el), path);
        let mut date = SnacDate {
            is_range: true,
            ..SnacDate::default()
        };
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::FromDate => date.from = self.date_point(child, &child_path),
                EacElement::ToDate => date.to = self.date_point(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
        date
    }

    fn place(&mut self, el: &XmlElement, path: &ElementPath) -> Place {
        self.residual(&Attrs::new(el), path);
        let mut place = Place::default();
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::PlaceEntry => {
                    place.original = self.plain_leaf(child, &child_path).unwrap_or_default();
                }
                EacElement::PlaceRole => {
                    let text = self.required_plain_leaf(child, &child_path);
                    place.role = self.term_text(text, VocabularyType::PlaceType);
                }
                EacElement::DescriptiveNote => place.note = self.note(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
        place
    }

    /// Second dispatch, on the `localType` keyword
    fn local_description(&mut self, el: &XmlElement, path: &ElementPath) {
        let mut attrs = Attrs::new(el);
        let keyword = attrs
            .take("localType")
            .map(|t| self.vocabulary.resolve_term(t, VocabularyType::Unknown).label);
        let Some(kind) = keyword.as_deref().and_then(descriptive_kind) else {
            self.unknown(el, path);
            return;
        };
        let mut children = el.elements();
        let first = children.next();
        if first.is_none() && el.text().is_empty() {
            self.unknown(el, path);
            return;
        }
        self.residual(&attrs, path);

        let value = match first {
            Some(first) => self.required_plain_leaf(first, &path.child(&first.name)),
            None => non_empty(el.text()),
        };
        for extra in children {
            self.unknown(extra, &path.child(&extra.name));
        }
        if let Some(term) = self.term_text(value, kind.vocabulary()) {
            let node = TermNode::new(kind, term);
            match kind {
                DescriptiveKind::Subject => self.graph.subjects.push(node),
                DescriptiveKind::Nationality => self.graph.nationalities.push(node),
                DescriptiveKind::Gender => self.graph.genders.push(node),
                DescriptiveKind::Occupation => self.graph.occupations.push(node),
                DescriptiveKind::Function => self.graph.functions.push(node),
            }
        }
    }

    /// `occupation` / `function`, each wrapping a single `term`
    fn term_node(
        &mut self,
        el: &XmlElement,
        path: &ElementPath,
        kind: DescriptiveKind,
    ) -> Option<TermNode> {
        if !self.requires_child(el, path, EacElement::Term) {
            return None;
        }
        self.residual(&Attrs::new(el), path);
        let mut value = None;
        let mut seen = false;
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::Term if !seen => {
                    seen = true;
                    value = self.required_plain_leaf(child, &child_path);
                }
                _ => self.unknown(child, &child_path),
            }
        }
        self.term_text(value, kind.vocabulary())
            .map(|term| TermNode::new(kind, term))
    }

    // ---- relations ---------------------------------------------------------

    fn relations(&mut self, el: &XmlElement, path: &ElementPath) {
        self.residual(&Attrs::new(el), path);
        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::CpfRelation => {
                    let relation = self.cpf_relation(child, &child_path);
                    self.graph.relations.push(relation);
                }
                EacElement::ResourceRelation => {
                    let relation = self.resource_relation(child, &child_path);
                    self.graph.resource_relations.push(relation);
                }
                _ => self.unknown(child, &child_path),
            }
        }
    }

    fn cpf_relation(&mut self, el: &XmlElement, path: &ElementPath) -> ConstellationRelation {
        let mut attrs = Attrs::new(el);
        attrs.take("type");
        let mut relation = ConstellationRelation {
            target_ark_id: attrs.take("href").map(str::to_string),
            relation_type: self.term(attrs.take("arcrole"), VocabularyType::RelationType),
            target_entity_type: self.term(attrs.take("role"), VocabularyType::EntityType),
            cpf_relation_type: self.term(attrs.take("cpfRelationType"), VocabularyType::RelationType),
            ..ConstellationRelation::default()
        };
        self.residual(&attrs, path);

        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::RelationEntry if relation.content.is_none() => {
                    relation.content = self.required_plain_leaf(child, &child_path);
                }
                EacElement::DescriptiveNote => relation.note = self.note(child, &child_path),
                _ => {
                    if !self.date_child(child, &child_path, &mut relation.dates) {
                        self.unknown(child, &child_path);
                    }
                }
            }
        }
        relation
    }

    fn resource_relation(&mut self, el: &XmlElement, path: &ElementPath) -> ResourceRelation {
        let mut attrs = Attrs::new(el);
        attrs.take("type");
        let mut resource = Resource {
            document_type: self.term(attrs.take("role"), VocabularyType::DocumentType),
            link: attrs.take("href").map(str::to_string),
            ..Resource::default()
        };
        let mut relation = ResourceRelation {
            role: self.term(attrs.take("arcrole"), VocabularyType::DocumentRole),
            ..ResourceRelation::default()
        };
        self.residual(&attrs, path);

        for child in el.elements() {
            let child_path = path.child(&child.name);
            match EacElement::from_local_name(&child.name) {
                EacElement::RelationEntry if resource.title.is_none() => {
                    resource.title = self.required_plain_leaf(child, &child_path);
                }
                EacElement::ObjectXmlWrap => {
                    let wrapped = non_empty(self.doc.inner_raw(child).trim().to_string());
                    if wrapped.is_none() {
                        self.unknown(child, &child_path);
                        continue;
                    }
                    self.residual(&Attrs::new(child), &child_path);
                    resource.object_xml_wrap = wrapped;
                }
                EacElement::DescriptiveNote => relation.note = self.note(child, &child_path),
                _ => self.unknown(child, &child_path),
            }
        }
        relation.resource = Some(resource);
        relation
    }
}

/// `localDescription/@localType` keyword → kind
fn descriptive_kind(keyword: &str) -> Option<DescriptiveKind> {
    match keyword.to_ascii_lowercase().as_str() {
        "associatedsubject" | "subject" => Some(DescriptiveKind::Subject),
        "nationalityofentity" | "nationality" => Some(DescriptiveKind::Nationality),
        "gender" => Some(DescriptiveKind::Gender),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snac_model::CollectingSink;

    fn parse(xml: &str) -> (Constellation, Ledger) {
        EacParser::with_defaults().parse(xml.as_bytes()).unwrap()
    }

    fn wrap(control: &str, description: &str) -> String {
        format!(
            r#"<eac-cpf xmlns="urn:isbn:1-931666-33-4" xmlns:xlink="http://www.w3.org/1999/xlink">
                <control>{control}</control>
                <cpfDescription>{description}</cpfDescription>
            </eac-cpf>"#
        )
    }

    #[test]
    fn control_fields() {
        let (c, ledger) = parse(&wrap(
            r#"<recordId>ark:/99166/w6tb1zzb</recordId>
               <otherRecordId localType="http://socialarchive.iath.virginia.edu/control/term#MergedRecord">http://example.org/r/1</otherRecordId>
               <maintenanceStatus>revised</maintenanceStatus>
               <maintenanceAgency><agencyName>SNAC</agencyName></maintenanceAgency>
               <languageDeclaration>
                 <language languageCode="eng">English</language>
                 <script scriptCode="Latn">Latin Alphabet</script>
               </languageDeclaration>
               <conventionDeclaration><citation>VIAF</citation></conventionDeclaration>"#,
            "",
        ));
        assert!(ledger.is_empty(), "{:?}", ledger.entries());
        assert_eq!(c.ark.as_deref(), Some("ark:/99166/w6tb1zzb"));
        assert_eq!(c.other_record_ids.len(), 1);
        let other = &c.other_record_ids[0];
        assert_eq!(other.uri, "http://example.org/r/1");
        assert_eq!(other.record_type.as_ref().unwrap().label, "MergedRecord");
        assert_eq!(c.maintenance_status.as_ref().unwrap().label, "revised");
        assert_eq!(c.maintenance_agency.as_deref(), Some("SNAC"));
        let lang = c.language_declaration.as_ref().unwrap();
        assert_eq!(lang.language.as_ref().unwrap().label, "eng");
        assert_eq!(lang.script_name.as_deref(), Some("Latin Alphabet"));
        assert_eq!(c.convention_declarations[0].citation, "VIAF");
    }

    #[test]
    fn extra_agency_children_are_ledgered() {
        let (c, ledger) = parse(&wrap(
            "<maintenanceAgency><agencyName>SNAC</agencyName><agencyCode>US-ViU</agencyCode></maintenanceAgency>",
            "",
        ));
        assert_eq!(c.maintenance_agency.as_deref(), Some("SNAC"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.entries()[0].structural_path.to_string(),
            "eac-cpf/control/maintenanceAgency/agencyCode"
        );
    }

    #[test]
    fn agency_name_is_found_by_name() {
        let (c, ledger) = parse(&wrap(
            "<maintenanceAgency><agencyCode>US-ViU</agencyCode><agencyName>SNAC</agencyName></maintenanceAgency>",
            "",
        ));
        assert_eq!(c.maintenance_agency.as_deref(), Some("SNAC"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].name, "agencyCode");
    }

    #[test]
    fn notes_keep_paragraph_text_only() {
        let (c, ledger) = parse(&wrap(
            "",
            r#"<description><place>
                 <placeEntry>Rome</placeEntry>
                 <descriptiveNote><p>Born <span>here</span></p><p>twice</p><list><item>x</item></list></descriptiveNote>
               </place></description>"#,
        ));
        assert_eq!(c.places[0].note.as_deref(), Some("Born here twice"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.entries()[0].structural_path.to_string(),
            "eac-cpf/cpfDescription/description/place/descriptiveNote/list"
        );
    }

    #[test]
    fn residual_attributes_land_on_their_own_element() {
        let (_, ledger) = parse(&wrap(
            r#"<languageDeclaration><language languageCode="eng" extra="1">English</language></languageDeclaration>"#,
            "",
        ));
        assert_eq!(ledger.len(), 1);
        let entry = &ledger.entries()[0];
        assert!(entry.is_attribute);
        assert_eq!(entry.name, "extra");
        assert_eq!(entry.value, "1");
        assert_eq!(
            entry.structural_path.to_string(),
            "eac-cpf/control/languageDeclaration/language"
        );
    }

    #[test]
    fn name_entries_and_contributors() {
        let (c, ledger) = parse(&wrap(
            "",
            r#"<identity>
                 <entityType>person</entityType>
                 <nameEntry preferenceScore="99" xml:lang="en">
                   <part>Smith, John</part>
                   <alternativeForm>VIAF</alternativeForm>
                   <authorizedForm>LC</authorizedForm>
                   <useDates><dateRange><fromDate standardDate="1900">1900</fromDate><toDate standardDate="1980">1980</toDate></dateRange></useDates>
                 </nameEntry>
                 <nameEntry preferenceScore="not a number"><part>Smith, J.</part></nameEntry>
               </identity>"#,
        ));
        assert_eq!(c.entity_type.as_ref().unwrap().label, "person");
        assert_eq!(c.name_entries.len(), 2);
        let first = &c.name_entries[0];
        assert_eq!(first.original, "Smith, John");
        assert_eq!(first.preference_score, Some(99.0));
        assert_eq!(first.contributors.len(), 2);
        assert_eq!(first.contributors[0].name, "VIAF");
        assert_eq!(
            first.contributors[1].contributor_type.as_ref().unwrap().label,
            "authorizedForm"
        );
        assert_eq!(first.use_dates.len(), 1);
        assert!(first.use_dates[0].is_range);
        assert_eq!(
            first.language.as_ref().and_then(|l| l.language.as_ref()).map(|t| t.label.as_str()),
            Some("en")
        );

        // An unparsable score stays unmapped rather than being guessed
        assert_eq!(c.name_entries[1].preference_score, None);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].name, "preferenceScore");
    }

    #[test]
    fn exist_dates_forms() {
        let (c, ledger) = parse(&wrap(
            "",
            r#"<description><existDates>
                 <dateRange>
                   <fromDate standardDate="-0045" localType="http://socialarchive.iath.virginia.edu/control/term#Birth" notBefore="-0046">45 BC</fromDate>
                   <toDate standardDate="0012">12</toDate>
                 </dateRange>
                 <descriptiveNote><p>approximate</p></descriptiveNote>
               </existDates></description>"#,
        ));
        assert!(ledger.is_empty(), "{:?}", ledger.entries());
        let date = &c.exist_dates[0];
        assert!(date.is_range);
        assert!(date.from.is_bc);
        assert_eq!(date.from.date.as_deref(), Some("0045"));
        assert_eq!(date.from.original.as_deref(), Some("45 BC"));
        assert_eq!(date.from.fuzzy.not_before.as_deref(), Some("-0046"));
        assert_eq!(date.from.date_type.as_ref().unwrap().label, "Birth");
        assert_eq!(date.to.to_standard().as_deref(), Some("0012"));
        assert_eq!(date.note.as_deref(), Some("approximate"));

        let (c, _) = parse(&wrap(
            "",
            r#"<description><existDates><dateSet>
                 <date standardDate="1900">1900</date>
                 <date standardDate="1950">1950</date>
               </dateSet></existDates></description>"#,
        ));
        assert_eq!(c.exist_dates.len(), 2);
        assert!(!c.exist_dates[1].is_range);
    }

    #[test]
    fn local_description_dispatches_on_local_type() {
        let (c, ledger) = parse(&wrap(
            "",
            r#"<description>
                 <localDescription localType="http://socialarchive.iath.virginia.edu/control/term#AssociatedSubject"><term>Poetry</term></localDescription>
                 <localDescription localType="http://socialarchive.iath.virginia.edu/control/term#nationalityOfEntity"><placeEntry>Italy</placeEntry></localDescription>
                 <localDescription localType="gender"><term>Male</term></localDescription>
                 <localDescription localType="http://example.org/#mystery"><term>?</term></localDescription>
                 <occupation><term>Poets</term></occupation>
                 <function><term>Teaching</term></function>
               </description>"#,
        ));
        assert_eq!(c.subjects[0].term.label, "Poetry");
        assert_eq!(c.nationalities[0].term.label, "Italy");
        assert_eq!(c.genders[0].term.label, "Male");
        assert_eq!(c.occupations[0].term.label, "Poets");
        assert_eq!(c.functions[0].term.label, "Teaching");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].name, "localDescription");
    }

    #[test]
    fn biog_hist_is_kept_verbatim() {
        let fragment = r#"<biogHist xml:lang="en"><p>Born in <span style="x">Rome</span> &amp; raised.</p>
  <chronList/></biogHist>"#;
        let (c, ledger) = parse(&wrap("", &format!("<description>{fragment}</description>")));
        assert!(ledger.is_empty());
        assert_eq!(c.biog_hists[0].text, fragment);
        assert!(c.biog_hists[0].language.is_some());
    }

    #[test]
    fn prefixed_biog_hist_is_stored_unprefixed() {
        let (c, ledger) = parse(
            r#"<eac:eac-cpf xmlns:eac="urn:isbn:1-931666-33-4"><eac:cpfDescription><eac:description><eac:biogHist xml:lang="en"><eac:p>Poet</eac:p></eac:biogHist></eac:description></eac:cpfDescription></eac:eac-cpf>"#,
        );
        assert!(ledger.is_empty(), "{:?}", ledger.entries());
        assert_eq!(c.biog_hists[0].text, r#"<biogHist xml:lang="en"><p>Poet</p></biogHist>"#);
        assert!(c.biog_hists[0].language.is_some());
    }

    #[test]
    fn empty_mapped_elements_are_ledgered() {
        let (c, ledger) = parse(&wrap(
            r#"<otherRecordId localType="http://socialarchive.iath.virginia.edu/control/term#sameAs"/>
               <conventionDeclaration/>"#,
            r#"<description>
                 <occupation><term/></occupation>
                 <function/>
                 <localDescription localType="gender"/>
               </description>"#,
        ));
        assert!(c.other_record_ids.is_empty());
        assert!(c.convention_declarations.is_empty());
        assert!(c.occupations.is_empty());
        assert!(c.functions.is_empty());
        assert!(c.genders.is_empty());

        let paths: Vec<String> = ledger
            .entries()
            .iter()
            .map(|e| e.structural_path.to_string())
            .collect();
        assert_eq!(
            paths,
            [
                "eac-cpf/control/otherRecordId",
                "eac-cpf/control/conventionDeclaration",
                "eac-cpf/cpfDescription/description/occupation/term",
                "eac-cpf/cpfDescription/description/function",
                "eac-cpf/cpfDescription/description/localDescription",
            ]
        );
        assert!(ledger.entries().iter().all(|e| !e.is_attribute));
        assert_eq!(
            ledger.entries()[0].value,
            r#"<otherRecordId localType="http://socialarchive.iath.virginia.edu/control/term#sameAs"/>"#
        );
    }

    #[test]
    fn blank_attributes_are_ledgered() {
        let (c, ledger) = parse(&wrap(
            r#"<otherRecordId localType="  ">http://example.org/r/1</otherRecordId>"#,
            "",
        ));
        assert_eq!(c.other_record_ids.len(), 1);
        assert_eq!(c.other_record_ids[0].record_type, None);
        assert_eq!(ledger.len(), 1);
        let entry = &ledger.entries()[0];
        assert!(entry.is_attribute);
        assert_eq!(entry.name, "localType");
        assert_eq!(entry.structural_path.to_string(), "eac-cpf/control/otherRecordId");
    }

    #[test]
    fn relations_are_typed() {
        let (c, ledger) = parse(&wrap(
            "",
            r#"<relations>
                 <cpfRelation xlink:type="simple" xlink:href="http://n2t.net/ark:/99166/x1" xlink:arcrole="http://socialarchive.iath.virginia.edu/control/term#associatedWith" xlink:role="http://socialarchive.iath.virginia.edu/control/term#person" cpfRelationType="associative">
                   <relationEntry>Jones, Mary</relationEntry>
                   <date standardDate="1950">1950</date>
                   <descriptiveNote><p>Correspondent</p></descriptiveNote>
                 </cpfRelation>
                 <resourceRelation xlink:type="simple" xlink:role="http://socialarchive.iath.virginia.edu/control/term#ArchivalResource" xlink:arcrole="http://socialarchive.iath.virginia.edu/control/term#creatorOf" xlink:href="http://example.org/findingaid">
                   <relationEntry>Papers, 1900-1950</relationEntry>
                   <objectXMLWrap><container xmlns="http://example.org/ns"><box>1</box></container></objectXMLWrap>
                   <descriptiveNote><p>12 boxes</p></descriptiveNote>
                 </resourceRelation>
               </relations>"#,
        ));
        assert!(ledger.is_empty(), "{:?}", ledger.entries());

        let rel = &c.relations[0];
        assert_eq!(rel.target_ark_id.as_deref(), Some("http://n2t.net/ark:/99166/x1"));
        assert_eq!(rel.relation_type.as_ref().unwrap().label, "associatedWith");
        assert_eq!(rel.target_entity_type.as_ref().unwrap().label, "person");
        assert_eq!(rel.cpf_relation_type.as_ref().unwrap().label, "associative");
        assert_eq!(rel.content.as_deref(), Some("Jones, Mary"));
        assert_eq!(rel.note.as_deref(), Some("Correspondent"));
        assert_eq!(rel.dates.len(), 1);

        let res = &c.resource_relations[0];
        assert_eq!(res.role.as_ref().unwrap().label, "creatorOf");
        assert_eq!(res.note.as_deref(), Some("12 boxes"));
        let resource = res.resource.as_ref().unwrap();
        assert_eq!(resource.title.as_deref(), Some("Papers, 1900-1950"));
        assert_eq!(resource.link.as_deref(), Some("http://example.org/findingaid"));
        assert_eq!(
            resource.document_type.as_ref().unwrap().label,
            "ArchivalResource"
        );
        assert_eq!(
            resource.object_xml_wrap.as_deref(),
            Some(r#"<container xmlns="http://example.org/ns"><box>1</box></container>"#)
        );
    }

    #[test]
    fn foreign_root_is_ledgered_whole() {
        let sink = Arc::new(CollectingSink::new());
        let parser = EacParser::new(Arc::new(LocalVocabulary::new()), sink.clone());
        let (c, ledger) = parser.parse(b"<ead><archdesc/></ead>").unwrap();
        assert!(c.is_empty());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].value, "<ead><archdesc/></ead>");
        assert!(sink
            .for_stage(Stage::Parse)
            .iter()
            .any(|d| d.level == Level::Warn));
    }

    #[test]
    fn parsed_nodes_carry_no_operation() {
        let (c, _) = parse(&wrap(
            "<recordId>ark:/1/2</recordId>",
            "<identity><nameEntry><part>X</part></nameEntry></identity>",
        ));
        assert!(!c.meta.operation.is_set());
        assert!(!c.name_entries[0].meta.operation.is_set());
        assert_eq!(c.meta.id, None);
    }
}
