//! Constellation → EAC-CPF emission
//!
//! Writes the graph back as a single EAC-CPF document. Every non-null field
//! is looked up in the [`TemplateTable`] before it is written. Typed free
//! text is fully entity-decoded and escaped by the writer; raw fragments
//! (`biogHist`, `objectXMLWrap`) are written as markup with only their HTML
//! named entities replaced.
//!
//! The `sameAs` promotion runs on copies of the identifier and relation
//! lists, so serializing never mutates the graph.

use crate::config::PipelineConfig;
use crate::entities::{decode_fragment, decode_text};
use crate::error::SerializeError;
use crate::same_as;
use crate::templates::{FieldPath, TemplateTable};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use snac_model::{
    Constellation, ConstellationRelation, DatePoint, DiagnosticsSink, Language, NameEntry,
    ResourceRelation, SameAs, SharedSink, SnacDate, Stage, Term, TermNode, TracingSink,
};
use std::borrow::Cow;
use std::fmt;

/// EAC-CPF namespace, written as the default namespace
pub const EAC_NS: &str = "urn:isbn:1-931666-33-4";
/// XLink namespace
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
/// SNAC extension namespace
pub const SNAC_NS: &str = "http://socialarchive.iath.virginia.edu/";

type Attr<'a> = (&'a str, Option<&'a str>);

/// `biogHist` markup for plain narrative text, as a single paragraph
///
/// `BiogHist::text` always holds a whole `<biogHist>` element; this is the
/// way to build one from typed text.
#[must_use]
pub fn biog_hist_markup(text: &str) -> String {
    format!("<biogHist><p>{}</p></biogHist>", escape(text))
}

/// Check `markup` is exactly one unprefixed `<name>` element and put
/// `lang` on it unless it already carries `xml:lang`
fn root_fragment<'m>(
    field: FieldPath,
    name: &str,
    markup: &'m str,
    lang: Option<&str>,
) -> Result<Cow<'m, str>, SerializeError> {
    let invalid = |reason: String| SerializeError::InvalidFragment { field, reason };

    let mut reader = Reader::from_str(markup);
    let (start, mut depth) = match reader.read_event() {
        Ok(Event::Start(e)) => (e, 1usize),
        Ok(Event::Empty(e)) => (e, 0),
        _ => return Err(invalid(format!("expected a <{name}> element"))),
    };
    if start.name().as_ref() != name.as_bytes() {
        return Err(invalid(format!(
            "root is <{}>, expected <{name}>",
            String::from_utf8_lossy(start.name().as_ref())
        )));
    }
    while depth > 0 {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => return Err(invalid(format!("unclosed <{name}>"))),
            Err(e) => return Err(invalid(e.to_string())),
            Ok(_) => {}
        }
    }
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(t)) if t.iter().all(u8::is_ascii_whitespace) => {}
            Ok(Event::Comment(_)) => {}
            _ => return Err(invalid(format!("content after </{name}>"))),
        }
    }

    let has_lang = start
        .attributes()
        .flatten()
        .any(|a| a.key.as_ref() == b"xml:lang");
    match lang.filter(|_| !has_lang) {
        Some(lang) => {
            let (head, tail) = markup.split_at(1 + name.len());
            Ok(Cow::Owned(format!("{head} xml:lang=\"{}\"{tail}", escape(lang))))
        }
        None => Ok(Cow::Borrowed(markup)),
    }
}

/// Thin wrapper mapping writer failures into [`SerializeError`]
struct Emitter {
    writer: Writer<Vec<u8>>,
}

impl Emitter {
    fn new(indent: Option<(u8, usize)>) -> Self {
        let writer = match indent {
            Some((ch, width)) => Writer::new_with_indent(Vec::new(), ch, width),
            None => Writer::new(Vec::new()),
        };
        Self { writer }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), SerializeError> {
        self.writer
            .write_event(event)
            .map_err(|e| SerializeError::write(e.to_string()))
    }

    fn tag<'a>(name: &'a str, attrs: &[Attr<'a>]) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for (key, value) in attrs {
            if let Some(value) = value {
                start.push_attribute((*key, *value));
            }
        }
        start
    }

    fn open(&mut self, name: &str, attrs: &[Attr<'_>]) -> Result<(), SerializeError> {
        self.event(Event::Start(Self::tag(name, attrs)))
    }

    fn close(&mut self, name: &str) -> Result<(), SerializeError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Element holding decoded text; empty when there is none
    fn text_element(
        &mut self,
        name: &str,
        attrs: &[Attr<'_>],
        text: Option<&str>,
    ) -> Result<(), SerializeError> {
        match text.filter(|t| !t.is_empty()) {
            Some(text) => {
                self.open(name, attrs)?;
                self.event(Event::Text(BytesText::new(&decode_text(text))))?;
                self.close(name)
            }
            None => self.event(Event::Empty(Self::tag(name, attrs))),
        }
    }

    /// Markup fragment written without escaping
    fn fragment(&mut self, markup: &str) -> Result<(), SerializeError> {
        self.writer
            .write_indent()
            .map_err(|e| SerializeError::write(e.to_string()))?;
        self.event(Event::Text(BytesText::from_escaped(decode_fragment(markup))))
    }

    fn note(&mut self, note: Option<&str>) -> Result<(), SerializeError> {
        if let Some(note) = note.filter(|n| !n.is_empty()) {
            self.open("descriptiveNote", &[])?;
            self.text_element("p", &[], Some(note))?;
            self.close("descriptiveNote")?;
        }
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn label(term: Option<&Term>) -> Option<&str> {
    term.map(|t| t.label.as_str())
}

fn attribute(term: Option<&Term>) -> Option<&str> {
    term.map(Term::attribute_value)
}

/// Graph → EAC-CPF writer
#[derive(Clone)]
pub struct EacSerializer {
    templates: TemplateTable,
    indent: Option<(u8, usize)>,
    apply_same_as: bool,
    sink: SharedSink,
}

impl EacSerializer {
    /// Create serializer from configuration
    #[must_use]
    pub fn new(config: &PipelineConfig, sink: SharedSink) -> Self {
        let indent = u8::try_from(config.indent_char)
            .ok()
            .filter(u8::is_ascii_whitespace)
            .filter(|_| config.indent_width > 0)
            .map(|ch| (ch, config.indent_width));
        Self {
            templates: TemplateTable::default(),
            indent,
            apply_same_as: config.apply_same_as,
            sink,
        }
    }

    /// With a custom template table
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateTable) -> Self {
        self.templates = templates;
        self
    }

    fn element(&self, field: FieldPath) -> Result<&str, SerializeError> {
        Ok(self.templates.get(field)?.element())
    }

    /// Serialize `graph` as one EAC-CPF document
    ///
    /// # Errors
    /// - `SerializeError::MissingTemplate` when a populated field has no mapping
    /// - `SerializeError::InvalidFragment` when a `biogHist` is not a single
    ///   `<biogHist>` element
    /// - `SerializeError::Write` if the writer fails
    pub fn serialize(&self, graph: &Constellation) -> Result<Vec<u8>, SerializeError> {
        let (other_record_ids, relations) = if self.apply_same_as {
            same_as::reconcile(
                &graph.other_record_ids,
                &graph.relations,
                graph.entity_type.as_ref(),
            )
        } else {
            (graph.other_record_ids.clone(), graph.relations.clone())
        };
        let promoted = graph.other_record_ids.len() - other_record_ids.len();
        if promoted > 0 {
            self.sink.debug(
                Stage::Transform,
                &format!("promoted {promoted} sameAs identifier(s) to relations"),
            );
        }

        let mut out = Emitter::new(self.indent);
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        out.open(
            "eac-cpf",
            &[
                ("xmlns", Some(EAC_NS)),
                ("xmlns:xlink", Some(XLINK_NS)),
                ("xmlns:snac", Some(SNAC_NS)),
            ],
        )?;
        self.control(&mut out, graph, &other_record_ids)?;
        out.open("cpfDescription", &[])?;
        self.identity(&mut out, graph)?;
        self.description(&mut out, graph)?;
        self.relations(&mut out, &relations, &graph.resource_relations)?;
        out.close("cpfDescription")?;
        out.close("eac-cpf")?;

        let bytes = out.finish();
        self.sink.info(
            Stage::Serialize,
            &format!("serialized {} node(s) into {} bytes", graph.node_count(), bytes.len()),
        );
        Ok(bytes)
    }

    fn control(
        &self,
        out: &mut Emitter,
        graph: &Constellation,
        other_record_ids: &[SameAs],
    ) -> Result<(), SerializeError> {
        out.open("control", &[])?;
        if let Some(ark) = &graph.ark {
            out.text_element(self.element(FieldPath::Ark)?, &[], Some(ark))?;
        }
        for id in other_record_ids {
            out.text_element(
                self.element(FieldPath::OtherRecordId)?,
                &[("localType", attribute(id.record_type.as_ref()))],
                Some(&id.uri),
            )?;
        }
        if let Some(status) = &graph.maintenance_status {
            out.text_element(
                self.element(FieldPath::MaintenanceStatus)?,
                &[],
                Some(&status.label),
            )?;
        }
        if let Some(agency) = &graph.maintenance_agency {
            let name = self.element(FieldPath::MaintenanceAgency)?;
            out.open("maintenanceAgency", &[])?;
            out.text_element(name, &[], Some(agency))?;
            out.close("maintenanceAgency")?;
        }
        if let Some(language) = &graph.language_declaration {
            self.language(out, self.element(FieldPath::LanguageDeclaration)?, language)?;
        }
        for declaration in &graph.convention_declarations {
            let name = self.element(FieldPath::ConventionDeclaration)?;
            out.open(name, &[])?;
            out.text_element("citation", &[], Some(&declaration.citation))?;
            out.close(name)?;
        }
        if !graph.maintenance_events.is_empty() {
            let name = self.element(FieldPath::MaintenanceEvent)?;
            out.open("maintenanceHistory", &[])?;
            for event in &graph.maintenance_events {
                out.open(name, &[])?;
                out.text_element("eventType", &[], label(event.event_type.as_ref()))?;
                out.text_element(
                    "eventDateTime",
                    &[("standardDateTime", event.standard_date_time.as_deref())],
                    event.event_date_time.as_deref(),
                )?;
                out.text_element("agentType", &[], label(event.agent_type.as_ref()))?;
                out.text_element("agent", &[], event.agent.as_deref())?;
                if event.event_description.is_some() {
                    out.text_element("eventDescription", &[], event.event_description.as_deref())?;
                }
                out.close(name)?;
            }
            out.close("maintenanceHistory")?;
        }
        if !graph.sources.is_empty() {
            let name = self.element(FieldPath::Source)?;
            out.open("sources", &[])?;
            for source in &graph.sources {
                out.open(
                    name,
                    &[
                        ("xlink:type", attribute(source.source_type.as_ref())),
                        ("xlink:href", source.uri.as_deref()),
                    ],
                )?;
                if source.display_name.is_some() {
                    out.text_element("sourceEntry", &[], source.display_name.as_deref())?;
                }
                out.note(source.note.as_deref())?;
                out.close(name)?;
            }
            out.close("sources")?;
        }
        out.close("control")
    }

    fn language(
        &self,
        out: &mut Emitter,
        name: &str,
        language: &Language,
    ) -> Result<(), SerializeError> {
        out.open(name, &[])?;
        if language.language.is_some() || language.language_name.is_some() {
            out.text_element(
                "language",
                &[("languageCode", attribute(language.language.as_ref()))],
                language.language_name.as_deref(),
            )?;
        }
        if language.script.is_some() || language.script_name.is_some() {
            out.text_element(
                "script",
                &[("scriptCode", attribute(language.script.as_ref()))],
                language.script_name.as_deref(),
            )?;
        }
        out.close(name)
    }

    fn identity(&self, out: &mut Emitter, graph: &Constellation) -> Result<(), SerializeError> {
        out.open("identity", &[])?;
        if let Some(entity_type) = &graph.entity_type {
            out.text_element(
                self.element(FieldPath::EntityType)?,
                &[],
                Some(&entity_type.label),
            )?;
        }
        for entry in &graph.name_entries {
            self.name_entry(out, entry)?;
        }
        out.close("identity")
    }

    fn name_entry(&self, out: &mut Emitter, entry: &NameEntry) -> Result<(), SerializeError> {
        let name = self.element(FieldPath::NameEntry)?;
        let score = entry.preference_score.map(|s| s.to_string());
        let lang = entry
            .language
            .as_ref()
            .and_then(|l| attribute(l.language.as_ref()));
        out.open(name, &[("preferenceScore", score.as_deref()), ("xml:lang", lang)])?;
        if !entry.original.is_empty() {
            out.text_element("part", &[], Some(&entry.original))?;
        }
        // part+, useDates?, (authorizedForm | alternativeForm)*
        if !entry.use_dates.is_empty() {
            let dates = self.element(FieldPath::UseDates)?;
            out.open(dates, &[])?;
            self.dates(out, &entry.use_dates)?;
            out.close(dates)?;
        }
        for contributor in &entry.contributors {
            let fallback = self.element(FieldPath::NameContributor)?;
            let form = match label(contributor.contributor_type.as_ref()) {
                Some(form @ ("alternativeForm" | "authorizedForm")) => form,
                _ => fallback,
            };
            out.text_element(form, &[], Some(&contributor.name))?;
        }
        out.close(name)
    }

    fn has_description(graph: &Constellation) -> bool {
        !(graph.exist_dates.is_empty()
            && graph.places.is_empty()
            && graph.subjects.is_empty()
            && graph.nationalities.is_empty()
            && graph.genders.is_empty()
            && graph.languages_used.is_empty()
            && graph.occupations.is_empty()
            && graph.functions.is_empty()
            && graph.biog_hists.is_empty())
    }

    fn description(&self, out: &mut Emitter, graph: &Constellation) -> Result<(), SerializeError> {
        if !Self::has_description(graph) {
            return Ok(());
        }
        out.open("description", &[])?;

        if !graph.exist_dates.is_empty() {
            let name = self.element(FieldPath::ExistDates)?;
            out.open(name, &[])?;
            self.dates(out, &graph.exist_dates)?;
            out.note(graph.exist_dates.iter().find_map(|d| d.note.as_deref()))?;
            out.close(name)?;
        }
        for place in &graph.places {
            let name = self.element(FieldPath::Place)?;
            out.open(name, &[])?;
            if place.role.is_some() {
                out.text_element("placeRole", &[], label(place.role.as_ref()))?;
            }
            out.text_element("placeEntry", &[], Some(&place.original))?;
            out.note(place.note.as_deref())?;
            out.close(name)?;
        }
        self.local_descriptions(out, FieldPath::Subject, "term", &graph.subjects)?;
        self.local_descriptions(out, FieldPath::Nationality, "placeEntry", &graph.nationalities)?;
        self.local_descriptions(out, FieldPath::Gender, "term", &graph.genders)?;
        for language in &graph.languages_used {
            self.language(out, self.element(FieldPath::LanguageUsed)?, language)?;
        }
        self.wrapped_terms(out, FieldPath::Occupation, &graph.occupations)?;
        self.wrapped_terms(out, FieldPath::Function, &graph.functions)?;
        for biog_hist in &graph.biog_hists {
            let name = self.element(FieldPath::BiogHist)?;
            let lang = biog_hist
                .language
                .as_ref()
                .and_then(|l| attribute(l.language.as_ref()));
            let markup = root_fragment(FieldPath::BiogHist, name, biog_hist.text.trim(), lang)?;
            out.fragment(&markup)?;
        }

        out.close("description")
    }

    fn local_descriptions(
        &self,
        out: &mut Emitter,
        field: FieldPath,
        child: &str,
        nodes: &[TermNode],
    ) -> Result<(), SerializeError> {
        if nodes.is_empty() {
            return Ok(());
        }
        let template = self.templates.get(field)?;
        for node in nodes {
            out.open(template.element(), &[("localType", template.local_type.as_deref())])?;
            out.text_element(child, &[], Some(&node.term.label))?;
            out.close(template.element())?;
        }
        Ok(())
    }

    fn wrapped_terms(
        &self,
        out: &mut Emitter,
        field: FieldPath,
        nodes: &[TermNode],
    ) -> Result<(), SerializeError> {
        if nodes.is_empty() {
            return Ok(());
        }
        let name = self.element(field)?;
        for node in nodes {
            out.open(name, &[])?;
            out.text_element("term", &[], Some(&node.term.label))?;
            out.close(name)?;
        }
        Ok(())
    }

    fn dates(&self, out: &mut Emitter, dates: &[SnacDate]) -> Result<(), SerializeError> {
        match dates {
            [] => Ok(()),
            [date] => self.date(out, date),
            many => {
                out.open("dateSet", &[])?;
                for date in many {
                    self.date(out, date)?;
                }
                out.close("dateSet")
            }
        }
    }

    fn date(&self, out: &mut Emitter, date: &SnacDate) -> Result<(), SerializeError> {
        if date.is_range {
            out.open("dateRange", &[])?;
            if !date.from.is_empty() {
                Self::date_point(out, "fromDate", &date.from)?;
            }
            if !date.to.is_empty() {
                Self::date_point(out, "toDate", &date.to)?;
            }
            out.close("dateRange")
        } else {
            Self::date_point(out, "date", &date.from)
        }
    }

    fn date_point(out: &mut Emitter, name: &str, point: &DatePoint) -> Result<(), SerializeError> {
        let standard = point.to_standard();
        out.text_element(
            name,
            &[
                ("standardDate", standard.as_deref()),
                ("localType", attribute(point.date_type.as_ref())),
                ("notBefore", point.fuzzy.not_before.as_deref()),
                ("notAfter", point.fuzzy.not_after.as_deref()),
            ],
            point.original.as_deref(),
        )
    }

    fn relations(
        &self,
        out: &mut Emitter,
        relations: &[ConstellationRelation],
        resource_relations: &[ResourceRelation],
    ) -> Result<(), SerializeError> {
        if relations.is_empty() && resource_relations.is_empty() {
            return Ok(());
        }
        out.open("relations", &[])?;
        for relation in relations {
            let name = self.element(FieldPath::Relation)?;
            out.open(
                name,
                &[
                    ("xlink:type", Some("simple")),
                    ("xlink:href", relation.target_ark_id.as_deref()),
                    ("xlink:arcrole", attribute(relation.relation_type.as_ref())),
                    ("xlink:role", attribute(relation.target_entity_type.as_ref())),
                    ("cpfRelationType", attribute(relation.cpf_relation_type.as_ref())),
                ],
            )?;
            if relation.content.is_some() {
                out.text_element("relationEntry", &[], relation.content.as_deref())?;
            }
            self.dates(out, &relation.dates)?;
            out.note(relation.note.as_deref())?;
            out.close(name)?;
        }
        for relation in resource_relations {
            let name = self.element(FieldPath::ResourceRelation)?;
            let resource = relation.resource.as_ref();
            out.open(
                name,
                &[
                    ("xlink:type", Some("simple")),
                    (
                        "xlink:role",
                        attribute(resource.and_then(|r| r.document_type.as_ref())),
                    ),
                    ("xlink:arcrole", attribute(relation.role.as_ref())),
                    ("xlink:href", resource.and_then(|r| r.link.as_deref())),
                ],
            )?;
            let title = resource
                .and_then(|r| r.title.as_deref())
                .or(relation.content.as_deref());
            if title.is_some() {
                out.text_element("relationEntry", &[], title)?;
            }
            if let Some(wrap) = resource.and_then(|r| r.object_xml_wrap.as_deref()) {
                out.open("objectXMLWrap", &[])?;
                out.fragment(wrap)?;
                out.close("objectXMLWrap")?;
            }
            out.note(relation.note.as_deref())?;
            out.close(name)?;
        }
        out.close("relations")
    }
}

impl Default for EacSerializer {
    fn default() -> Self {
        Self::new(&PipelineConfig::default(), TracingSink::shared())
    }
}

impl fmt::Debug for EacSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EacSerializer")
            .field("indent", &self.indent)
            .field("apply_same_as", &self.apply_same_as)
            .finish_non_exhaustive()
    }
}
