use super::predicate::{basic_or, exists, is_true, or, Predicate};
use std::sync::OnceLock;

/// Version tag of the MIDS element to GBIF field mapping below.
pub const SCHEMA_VERSION: &str = "mids-gbif-0.1";

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: &'static str,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaturityLevel {
    pub level: u8,
    pub elements: Vec<Element>,
}

impl MaturityLevel {
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.elements.iter().map(|element| &element.predicate)
    }
}

/// Ordered MIDS levels, lowest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MaturitySchema {
    pub version: &'static str,
    pub levels: Vec<MaturityLevel>,
}

impl MaturitySchema {
    pub fn new(version: &'static str, levels: Vec<MaturityLevel>) -> Self {
        Self { version, levels }
    }

    pub fn element_count(&self) -> usize {
        self.levels.iter().map(|level| level.elements.len()).sum()
    }
}

fn element(name: &'static str, predicate: Predicate) -> Element {
    Element { name, predicate }
}

/// The process-wide MIDS schema, built on first use.
pub fn mids() -> &'static MaturitySchema {
    static SCHEMA: OnceLock<MaturitySchema> = OnceLock::new();
    SCHEMA.get_or_init(build_mids)
}

fn build_mids() -> MaturitySchema {
    MaturitySchema::new(
        SCHEMA_VERSION,
        vec![
            MaturityLevel {
                level: 0,
                elements: vec![
                    // missing: materialSampleID, materialEntityID
                    element(
                        "PhysicalSpecimenID",
                        basic_or(["CATALOG_NUMBER", "OTHER_CATALOG_NUMBERS", "OCCURRENCE_ID"]),
                    ),
                    // missing: ownerInstitutionCode, institutionID
                    element(
                        "Organization",
                        basic_or(["INSTITUTION_KEY", "INSTITUTION_CODE"]),
                    ),
                ],
            },
            MaturityLevel {
                level: 1,
                elements: vec![
                    // VERBATIM_SCIENTIFIC_NAME stands in for vernacularName,
                    // ORGANISM_ID for organismName.
                    element(
                        "Name",
                        basic_or([
                            "SCIENTIFIC_NAME",
                            "VERBATIM_SCIENTIFIC_NAME",
                            "TAXON_KEY",
                            "ORGANISM_ID",
                        ]),
                    ),
                    element("SpecimenType", exists("BASIS_OF_RECORD")),
                    element("ObjectType", exists("PREPARATIONS")),
                    element("License", exists("LICENSE")),
                    element("Modified", exists("MODIFIED")),
                ],
            },
            MaturityLevel {
                level: 2,
                elements: vec![
                    // missing: county, municipality, verbatimLocality,
                    // verbatimLongitude, verbatimLatitude, countryCode
                    element(
                        "QualitativeLocation",
                        basic_or([
                            "LOCALITY",
                            "ISLAND",
                            "ISLAND_GROUP",
                            "CONTINENT",
                            "COUNTRY",
                            "STATE_PROVINCE",
                            "WATER_BODY",
                            "HIGHER_GEOGRAPHY",
                        ]),
                    ),
                    // missing: locationID, footprintWKT (GADM_GID covers most of it).
                    // HAS_COORDINATE replaces DECIMAL_LATITUDE/DECIMAL_LONGITUDE.
                    element(
                        "QuantitativeLocation",
                        or([is_true("HAS_COORDINATE"), exists("GADM_GID")]),
                    ),
                    element(
                        "CollectingAgent",
                        basic_or(["RECORDED_BY", "RECORDED_BY_ID"]),
                    ),
                    // missing: verbatimEventDate
                    element("CollectionDate", basic_or(["EVENT_DATE", "YEAR"])),
                    element(
                        "CollectorNumber",
                        basic_or(["FIELD_NUMBER", "RECORD_NUMBER"]),
                    ),
                    // missing: associatedMedia, identifier, references, accessURI
                    element("media", exists("MEDIA_TYPE")),
                ],
            },
            MaturityLevel {
                level: 3,
                elements: vec![
                    // missing: geodeticDatum, coordinatePrecision, footprintSRS,
                    // footprintWKT
                    element(
                        "GeographicalLocalityID",
                        or([
                            exists("COORDINATE_UNCERTAINTY_IN_METERS"),
                            is_true("HAS_COORDINATE"),
                        ]),
                    ),
                    element("InstitutionID", exists("INSTITUTION_KEY")),
                    element("CollectorID", exists("RECORDED_BY_ID")),
                    element("ScientificNameID", exists("TAXON_ID")),
                    element("IdentifiedByID", exists("IDENTIFIED_BY_ID")),
                ],
            },
        ],
    )
}
