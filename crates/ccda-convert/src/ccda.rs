//! CCDA to `Bundle` conversion.

use std::ffi::OsStr;

use ccda_ingest::RawDocument;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::DocumentConverter;
use crate::codes::{administrative_gender, code_system_uri, hl7_timestamp, observation_status};
use crate::error::{ConversionError, Result};
use crate::template::{ConversionTemplate, SectionRule, TemplateLoader};
use crate::xml::{Element, parse_document};

const ROOT_ELEMENT: &str = "ClinicalDocument";
const PATIENT_ID: &str = "patient";

/// Converter for HL7 CCDA documents.
#[derive(Debug, Default)]
pub struct CcdaConverter {
    templates: TemplateLoader,
}

impl CcdaConverter {
    pub fn new(templates: TemplateLoader) -> Self {
        Self { templates }
    }

    /// Converter searching `templates_dir` (a platform path list) and the
    /// directories in `CCDA_TEMPLATES_PATH`.
    pub fn from_search_path(templates_dir: &OsStr) -> Self {
        Self::new(TemplateLoader::from_search_path(templates_dir).with_env_search_path())
    }
}

impl DocumentConverter for CcdaConverter {
    fn convert(&self, template_name: &str, document: &RawDocument) -> Result<Value> {
        let template = self.templates.load(template_name)?;
        let text = document.text()?;
        let root = parse_document(&text).map_err(|message| ConversionError::Xml {
            document: document.name.clone(),
            message,
        })?;
        if root.name != ROOT_ELEMENT {
            return Err(ConversionError::NotClinicalDocument {
                document: document.name.clone(),
                found: root.name,
            });
        }
        let bundle = BundleBuilder::new(&template).build(&root);
        debug!(
            document = %document.name,
            encoding = %document.encoding,
            template = %template.name,
            entries = bundle["entry"].as_array().map_or(0, Vec::len),
            "converted document"
        );
        Ok(bundle)
    }
}

struct BundleBuilder<'t> {
    template: &'t ConversionTemplate,
    entries: Vec<Value>,
    observation_seq: usize,
}

impl<'t> BundleBuilder<'t> {
    fn new(template: &'t ConversionTemplate) -> Self {
        Self {
            template,
            entries: Vec::new(),
            observation_seq: 0,
        }
    }

    fn build(mut self, root: &Element) -> Value {
        let template = self.template;
        if let Some(patient) = root.find_path(&["recordTarget", "patientRole"]) {
            self.push_entry(patient_resource(patient));
        }

        let mut sections = Vec::new();
        collect_sections(root, &mut sections);
        for section in sections {
            let template_ids = section
                .children_named("templateId")
                .filter_map(|id| id.attr("root"));
            let code = section.child("code").and_then(|code| code.attr("code"));
            let Some(rule) = template.rule_for(template_ids, code) else {
                continue;
            };
            trace!(section = ?rule.name, category = %rule.category, "matched section");

            let mut observations = Vec::new();
            for entry in section.children_named("entry") {
                entry.find_outermost("observation", &mut observations);
            }
            for observation in observations {
                self.observation_seq += 1;
                let resource = observation_resource(observation, rule, self.observation_seq);
                self.push_entry(resource);
            }
        }

        json!({
            "resourceType": "Bundle",
            "type": "batch",
            "meta": {"tag": [{"code": template.name}]},
            "entry": self.entries,
        })
    }

    fn push_entry(&mut self, resource: Value) {
        let full_url = format!(
            "{}/{}",
            resource["resourceType"].as_str().unwrap_or("Resource"),
            resource["id"].as_str().unwrap_or_default()
        );
        self.entries.push(json!({
            "fullUrl": full_url,
            "resource": resource,
        }));
    }
}

/// Every `section`, including sections nested inside other sections.
fn collect_sections<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in &element.children {
        if child.name == "section" {
            out.push(child);
        }
        collect_sections(child, out);
    }
}

fn patient_resource(patient_role: &Element) -> Value {
    let mut resource = Map::new();
    resource.insert("resourceType".into(), json!("Patient"));
    resource.insert("id".into(), json!(PATIENT_ID));

    let identifiers: Vec<Value> = patient_role
        .children_named("id")
        .filter_map(identifier)
        .collect();
    if !identifiers.is_empty() {
        resource.insert("identifier".into(), Value::Array(identifiers));
    }

    if let Some(patient) = patient_role.child("patient") {
        let names: Vec<Value> = patient.children_named("name").map(human_name).collect();
        if !names.is_empty() {
            resource.insert("name".into(), Value::Array(names));
        }
        let gender = patient
            .child("administrativeGenderCode")
            .and_then(|code| code.attr("code"));
        resource.insert("gender".into(), json!(administrative_gender(gender)));
        if let Some(birth) = patient
            .child("birthTime")
            .and_then(|time| time.non_empty_attr("value"))
        {
            resource.insert("birthDate".into(), json!(hl7_timestamp(birth)));
        }
    }
    Value::Object(resource)
}

fn human_name(name: &Element) -> Value {
    let given: Vec<String> = name
        .children_named("given")
        .map(Element::deep_text)
        .filter(|given| !given.is_empty())
        .collect();
    let mut value = Map::new();
    if let Some(family) = name.child("family").map(Element::deep_text) {
        value.insert("family".into(), json!(family));
    }
    if !given.is_empty() {
        value.insert("given".into(), json!(given));
    }
    if value.is_empty() {
        let text = name.deep_text();
        if !text.is_empty() {
            value.insert("text".into(), json!(text));
        }
    }
    Value::Object(value)
}

fn identifier(id: &Element) -> Option<Value> {
    let root = id.non_empty_attr("root")?;
    let mut value = Map::new();
    value.insert("system".into(), json!(format!("urn:oid:{root}")));
    if let Some(extension) = id.non_empty_attr("extension") {
        value.insert("value".into(), json!(extension));
    }
    Some(Value::Object(value))
}

fn observation_resource(observation: &Element, rule: &SectionRule, seq: usize) -> Value {
    let mut category_coding = Map::new();
    category_coding.insert("system".into(), json!(rule.category_system));
    category_coding.insert("code".into(), json!(rule.category));
    if let Some(display) = &rule.category_display {
        category_coding.insert("display".into(), json!(display));
    }

    let mut resource = Map::new();
    resource.insert("resourceType".into(), json!("Observation"));
    resource.insert("id".into(), json!(format!("observation-{seq}")));

    let identifiers: Vec<Value> = observation
        .children_named("id")
        .filter_map(identifier)
        .collect();
    if !identifiers.is_empty() {
        resource.insert("identifier".into(), Value::Array(identifiers));
    }

    let status = observation
        .child("statusCode")
        .and_then(|status| status.attr("code"));
    resource.insert("status".into(), json!(observation_status(status)));
    resource.insert(
        "category".into(),
        json!([{ "coding": [Value::Object(category_coding)] }]),
    );
    if let Some(code) = observation.child("code") {
        resource.insert("code".into(), codeable_concept(code));
    }
    resource.insert(
        "subject".into(),
        json!({"reference": format!("Patient/{PATIENT_ID}")}),
    );
    if let Some(effective) = effective_time(observation) {
        resource.insert("effectiveDateTime".into(), json!(hl7_timestamp(effective)));
    }
    if let Some(value) = observation.child("value") {
        if let Some((key, converted)) = observation_value(value) {
            resource.insert(key.into(), converted);
        }
    }
    Value::Object(resource)
}

fn effective_time(observation: &Element) -> Option<&str> {
    let time = observation.child("effectiveTime")?;
    time.non_empty_attr("value").or_else(|| {
        time.child("low")
            .and_then(|low| low.non_empty_attr("value"))
    })
}

/// `code` plus its `translation`s as FHIR codings.
///
/// A `nullFlavor` element contributes no coding of its own, whether or not it
/// names a `codeSystem`; its translations are still converted.
fn codeable_concept(code: &Element) -> Value {
    let mut codings = Vec::new();
    if let Some(primary) = coding(code) {
        codings.push(primary);
    }
    codings.extend(code.children_named("translation").filter_map(coding));

    let mut concept = Map::new();
    concept.insert("coding".into(), Value::Array(codings));
    if let Some(text) = code
        .child("originalText")
        .map(Element::deep_text)
        .filter(|text| !text.is_empty())
    {
        concept.insert("text".into(), json!(text));
    }
    Value::Object(concept)
}

fn coding(code: &Element) -> Option<Value> {
    if code.attr("nullFlavor").is_some() {
        return None;
    }
    let system = code.non_empty_attr("codeSystem");
    let value = code.attr("code");
    if system.is_none() && value.is_none() {
        return None;
    }
    let mut coding = Map::new();
    if let Some(system) = system {
        coding.insert("system".into(), json!(code_system_uri(system.trim())));
    }
    coding.insert("code".into(), json!(value.unwrap_or_default().trim()));
    if let Some(display) = code.non_empty_attr("displayName") {
        coding.insert("display".into(), json!(display));
    }
    Some(Value::Object(coding))
}

fn observation_value(value: &Element) -> Option<(&'static str, Value)> {
    let kind = value
        .attr("type")
        .and_then(|kind| kind.rsplit(':').next())
        .unwrap_or_default();
    match kind {
        "PQ" => {
            let number = value
                .non_empty_attr("value")
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .and_then(serde_json::Number::from_f64)?;
            let mut quantity = Map::new();
            quantity.insert("value".into(), Value::Number(number));
            if let Some(unit) = value.non_empty_attr("unit") {
                quantity.insert("unit".into(), json!(unit));
                quantity.insert("system".into(), json!("http://unitsofmeasure.org"));
                quantity.insert("code".into(), json!(unit));
            }
            Some(("valueQuantity", Value::Object(quantity)))
        }
        "CD" | "CE" | "CO" | "CV" => Some(("valueCodeableConcept", codeable_concept(value))),
        _ => {
            let text = value.deep_text();
            let text = if text.is_empty() {
                value.non_empty_attr("value")?.to_string()
            } else {
                text
            };
            Some(("valueString", json!(text)))
        }
    }
}
