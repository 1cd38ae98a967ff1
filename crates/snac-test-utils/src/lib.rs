//! Testing utilities for SNAC workspace
//!
//! Shared EAC-CPF fixtures, graph builders and an in-memory store.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use snac_model::{
    Constellation, ConstellationStore, NameEntry, NodeMeta, Operation, RecordStatus, Resource,
    ResourceRelation, StoreError, Term, VocabularyType, WriteReceipt,
};
use std::collections::HashMap;

/// Smallest useful record
pub const MINIMAL_EAC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<eac-cpf xmlns="urn:isbn:1-931666-33-4" xmlns:xlink="http://www.w3.org/1999/xlink">
  <control>
    <recordId>ark:/99166/w6tb1zzb</recordId>
  </control>
  <cpfDescription>
    <identity>
      <entityType>person</entityType>
      <nameEntry preferenceScore="99">
        <part>Smith, John, 1900-1980</part>
      </nameEntry>
    </identity>
  </cpfDescription>
</eac-cpf>
"#;

/// Exact `biogHist` markup inside [`FULL_EAC`]
pub const FULL_BIOG_HIST: &str = r#"<biogHist>
        <p>Born in <span style="font-style:italic">Rome</span> in 45 BC &amp; raised abroad.</p>
        <chronList>
          <chronItem><date standardDate="-0045">45 BC</date><event>Birth</event></chronItem>
        </chronList>
      </biogHist>"#;

/// Record exercising every mapped element; parses with an empty ledger
pub const FULL_EAC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<eac-cpf xmlns="urn:isbn:1-931666-33-4" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:snac="http://socialarchive.iath.virginia.edu/">
  <control>
    <recordId>ark:/99166/w6tb1zzb</recordId>
    <otherRecordId localType="http://socialarchive.iath.virginia.edu/control/term#MergedRecord">http://snac.example.org/merged/17</otherRecordId>
    <otherRecordId localType="http://socialarchive.iath.virginia.edu/control/term#sameAs">http://viaf.org/viaf/12345</otherRecordId>
    <maintenanceStatus>revised</maintenanceStatus>
    <maintenanceAgency>
      <agencyName>SNAC: Social Networks and Archival Context</agencyName>
    </maintenanceAgency>
    <languageDeclaration>
      <language languageCode="eng">English</language>
      <script scriptCode="Latn">Latin Alphabet</script>
    </languageDeclaration>
    <conventionDeclaration>
      <citation>VIAF</citation>
    </conventionDeclaration>
    <maintenanceHistory>
      <maintenanceEvent>
        <eventType>revised</eventType>
        <eventDateTime standardDateTime="2015-03-01T12:00:00">March 1, 2015</eventDateTime>
        <agentType>machine</agentType>
        <agent>CPF merge program</agent>
        <eventDescription>Merged 3 records</eventDescription>
      </maintenanceEvent>
    </maintenanceHistory>
    <sources>
      <source xlink:type="simple" xlink:href="http://example.org/source/1">
        <sourceEntry>Smith family papers</sourceEntry>
        <descriptiveNote><p>Finding aid</p></descriptiveNote>
      </source>
    </sources>
  </control>
  <cpfDescription>
    <identity>
      <entityType>person</entityType>
      <nameEntry preferenceScore="99">
        <part>Smith, John, 45 BC-12</part>
        <alternativeForm>VIAF</alternativeForm>
        <authorizedForm>LC</authorizedForm>
        <useDates>
          <dateRange>
            <fromDate standardDate="-0045">45 BC</fromDate>
            <toDate standardDate="0012">12</toDate>
          </dateRange>
        </useDates>
      </nameEntry>
      <nameEntry preferenceScore="40">
        <part>Smith, J.</part>
      </nameEntry>
    </identity>
    <description>
      <existDates>
        <dateRange>
          <fromDate standardDate="-0045" localType="http://socialarchive.iath.virginia.edu/control/term#Birth">45 BC</fromDate>
          <toDate standardDate="0012" localType="http://socialarchive.iath.virginia.edu/control/term#Death">12</toDate>
        </dateRange>
        <descriptiveNote><p>Dates approximate</p></descriptiveNote>
      </existDates>
      <place>
        <placeRole>Birthplace</placeRole>
        <placeEntry>Rome (Italy)</placeEntry>
      </place>
      <localDescription localType="http://socialarchive.iath.virginia.edu/control/term#AssociatedSubject">
        <term>Poetry</term>
      </localDescription>
      <localDescription localType="http://socialarchive.iath.virginia.edu/control/term#nationalityOfEntity">
        <placeEntry>Italy</placeEntry>
      </localDescription>
      <localDescription localType="http://socialarchive.iath.virginia.edu/control/term#gender">
        <term>Male</term>
      </localDescription>
      <languageUsed>
        <language languageCode="lat">Latin</language>
      </languageUsed>
      <occupation>
        <term>Poets</term>
      </occupation>
      <function>
        <term>Teaching</term>
      </function>
      <biogHist>
        <p>Born in <span style="font-style:italic">Rome</span> in 45 BC &amp; raised abroad.</p>
        <chronList>
          <chronItem><date standardDate="-0045">45 BC</date><event>Birth</event></chronItem>
        </chronList>
      </biogHist>
    </description>
    <relations>
      <cpfRelation xlink:type="simple" xlink:href="http://n2t.net/ark:/99166/w6x12345" xlink:arcrole="http://socialarchive.iath.virginia.edu/control/term#associatedWith" xlink:role="http://socialarchive.iath.virginia.edu/control/term#person" cpfRelationType="associative">
        <relationEntry>Jones, Mary</relationEntry>
        <descriptiveNote><p>Correspondent</p></descriptiveNote>
      </cpfRelation>
      <resourceRelation xlink:type="simple" xlink:role="http://socialarchive.iath.virginia.edu/control/term#ArchivalResource" xlink:arcrole="http://socialarchive.iath.virginia.edu/control/term#creatorOf" xlink:href="http://example.org/findingaid/smith">
        <relationEntry>Smith family papers, 1900-1950</relationEntry>
        <objectXMLWrap><container xmlns="http://example.org/ns"><box>1</box></container></objectXMLWrap>
        <descriptiveNote><p>12 linear feet</p></descriptiveNote>
      </resourceRelation>
    </relations>
  </cpfDescription>
</eac-cpf>
"#;

/// [`MINIMAL_EAC`] with one unrecognized element under `control`
#[must_use]
pub fn eac_with_unknown_control_child(name: &str) -> String {
    MINIMAL_EAC.replace(
        "</recordId>",
        &format!("</recordId>\n    <{name} note=\"x\">payload</{name}>"),
    )
}

/// Person record ready for insertion
#[must_use]
pub fn person(name: &str) -> Constellation {
    let mut c = Constellation::new().with_operation(Operation::Insert);
    c.ark = Some("ark:/99166/w6test".to_string());
    c.entity_type = Some(Term::labelled("person", VocabularyType::EntityType));
    c.name_entries.push(NameEntry::new(name, Some(99.0)));
    c
}

/// Resource relation pointing at a stored resource
#[must_use]
pub fn resource_relation(id: i64, version: i64) -> ResourceRelation {
    ResourceRelation {
        resource: Some(Resource {
            meta: NodeMeta::stored(id, version),
            title: Some("Papers".to_string()),
            link: Some("http://example.org/findingaid".to_string()),
            ..Resource::default()
        }),
        ..ResourceRelation::default()
    }
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: i64,
    records: HashMap<i64, Vec<Constellation>>,
    locks: HashMap<i64, String>,
}

/// Versioned store kept in memory
///
/// New graphs get a fresh id. Updates must carry the current version or
/// the write fails with [`StoreError::Conflict`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a record for `holder`; writes by anyone else fail
    pub fn lock(&self, id: i64, holder: &str) {
        self.state.lock().locks.insert(id, holder.to_string());
    }

    /// Number of versions stored for `id`
    #[must_use]
    pub fn versions(&self, id: i64) -> usize {
        self.state.lock().records.get(&id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl ConstellationStore for InMemoryStore {
    async fn read(&self, id: i64, version: Option<i64>) -> Result<Constellation, StoreError> {
        let state = self.state.lock();
        let history = state.records.get(&id).ok_or(StoreError::NotFound(id))?;
        match version {
            None => history.last().cloned().ok_or(StoreError::NotFound(id)),
            Some(v) => history
                .iter()
                .find(|c| c.meta.version == Some(v))
                .cloned()
                .ok_or(StoreError::NotFound(id)),
        }
    }

    async fn read_status(&self, id: i64) -> Result<RecordStatus, StoreError> {
        let state = self.state.lock();
        if !state.records.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(if state.locks.contains_key(&id) {
            RecordStatus::Locked
        } else {
            RecordStatus::Published
        })
    }

    async fn write(
        &self,
        graph: &Constellation,
        editor: &str,
        _change_note: &str,
    ) -> Result<WriteReceipt, StoreError> {
        let mut state = self.state.lock();
        let (id, version) = match graph.meta.id {
            None => {
                state.next_id += 1;
                (state.next_id, 1)
            }
            Some(id) => {
                if let Some(holder) = state.locks.get(&id).filter(|h| *h != editor) {
                    return Err(StoreError::Locked {
                        id,
                        holder: holder.clone(),
                    });
                }
                let current = state
                    .records
                    .get(&id)
                    .and_then(|h| h.last())
                    .and_then(|c| c.meta.version)
                    .ok_or(StoreError::NotFound(id))?;
                let expected = graph.meta.version.unwrap_or(0);
                if expected != current {
                    return Err(StoreError::conflict(id, expected, current));
                }
                (id, current + 1)
            }
        };

        let mut stored = graph.clone();
        stored.meta = NodeMeta::stored(id, version);
        state.records.entry(id).or_default().push(stored.clone());
        Ok(WriteReceipt { version, stored })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_update() {
        let store = InMemoryStore::new();
        let first = store.write(&person("A"), "ed", "new").await.unwrap();
        assert_eq!(first.version, 1);
        let id = first.stored.meta.id.unwrap();

        let second = store.write(&first.stored, "ed", "edit").await.unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(store.versions(id), 2);
        assert_eq!(store.read(id, Some(1)).await.unwrap().meta.version, Some(1));
        assert_eq!(store.read_status(id).await.unwrap(), RecordStatus::Published);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let store = InMemoryStore::new();
        let first = store.write(&person("A"), "ed", "new").await.unwrap();
        store.write(&first.stored, "ed", "edit").await.unwrap();
        let err = store.write(&first.stored, "other", "late").await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn locks_block_other_editors() {
        let store = InMemoryStore::new();
        let first = store.write(&person("A"), "ed", "new").await.unwrap();
        let id = first.stored.meta.id.unwrap();
        store.lock(id, "ed");
        assert!(matches!(
            store.write(&first.stored, "other", "x").await,
            Err(StoreError::Locked { .. })
        ));
        assert!(store.write(&first.stored, "ed", "x").await.is_ok());
    }

    #[test]
    fn unknown_child_fixture() {
        let xml = eac_with_unknown_control_child("bogus");
        assert!(xml.contains("<bogus note=\"x\">payload</bogus>"));
    }
}
