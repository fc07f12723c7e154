// 文档合并：在模板深拷贝上按固定路径写入抽取结果，模板中无关内容原样保留。
use crate::extract::{
    AuditorIdentity, AuditDates, CustomerRecord, ExtractedFields, OrganizationProfile,
    SiteCategory,
};
use crate::merge::path::{
    child_object, ensure_list, ensure_object, merge_positional, set_if_present, set_string,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

const SITE_PRESENT: &str = "1";
const SITE_ABSENT: &str = "0";

#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    pub native_country: String,
    pub audit_days_performed: f64,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            native_country: "中国".to_string(),
            audit_days_performed: 1.5,
        }
    }
}

/// 调用方的模板不会被修改。
pub fn merge_document(template: &Value, fields: &ExtractedFields, settings: &MergeSettings) -> Value {
    let mut document = template.clone();
    write_identifiers(&mut document);
    write_audit_data(&mut document, fields, settings);
    write_organization(&mut document, &fields.organization, settings);
    write_sites(&mut document, fields);
    write_customers(&mut document, &fields.customers);
    write_documents(&mut document, &fields.documents);
    write_processes(&mut document, fields);
    write_results(&mut document, &fields.dates);
    document
}

fn write_identifiers(document: &mut Value) {
    let root = ensure_object(document, &[]);
    root.insert("uuid".to_string(), json!(Uuid::new_v4().to_string()));
    root.insert("created".to_string(), json!(Utc::now().timestamp_millis()));
}

fn write_audit_data(document: &mut Value, fields: &ExtractedFields, settings: &MergeSettings) {
    let audit = ensure_object(document, &["AuditData"]);
    let audit_date = child_object(audit, "AuditDate");
    set_if_present(audit_date, "Start", &fields.dates.start);
    set_if_present(audit_date, "End", &fields.dates.end);
    set_string(audit, "CbIdentificationNo", &fields.cb_identification_no);

    let team = ensure_list(audit, "AuditTeam");
    merge_positional(
        team,
        vec![team_entry(&fields.auditor, &fields.dates, settings)],
    );
}

fn team_entry(auditor: &AuditorIdentity, dates: &AuditDates, settings: &MergeSettings) -> Map<String, Value> {
    let mut entry = Map::new();
    set_if_present(&mut entry, "Name", &auditor.name);
    set_if_present(&mut entry, "CaaNo", &auditor.ccaa_number);
    set_if_present(&mut entry, "AuditorId", &auditor.card_id);
    entry.insert(
        "AuditDaysPerformed".to_string(),
        json!(settings.audit_days_performed),
    );
    let mut dates_on_site = Vec::new();
    if !dates.start.is_empty() {
        dates_on_site.push(json!({ "Date": dates.start, "Day": 1 }));
    }
    if !dates.end.is_empty() {
        dates_on_site.push(json!({ "Date": dates.end, "Day": 0.5 }));
    }
    if !dates_on_site.is_empty() {
        entry.insert("DatesOnSite".to_string(), Value::Array(dates_on_site));
    }
    entry
}

fn write_organization(document: &mut Value, profile: &OrganizationProfile, settings: &MergeSettings) {
    let org = ensure_object(document, &["OrganizationInformation"]);
    set_if_present(org, "OrganizationName", &profile.name);
    set_if_present(org, "IndustryCode", &profile.industry_code);
    set_if_present(org, "IATF_USI", &profile.iatf_usi);
    set_if_present(org, "TotalNumberEmployees", &profile.total_employees);
    set_if_present(org, "CertificateScope", &profile.certificate_scope);
    set_if_present(org, "Representative", &profile.representative);
    set_if_present(org, "Telephone", &profile.telephone);
    set_if_present(org, "Email", &profile.email);
    clear_products(org);

    // 中文地址不做地理拆分：城市与省份留空，国家固定为本国。
    let native = child_object(org, "AddressNative");
    set_if_present(native, "Street1", &profile.address.native_street);
    set_string(native, "City", "");
    set_string(native, "State", "");
    set_string(native, "Country", &settings.native_country);
    set_if_present(native, "PostalCode", &profile.postal_code);

    // 英文地址四个部分整体写入，拆不出的部分写空，避免与模板旧地址混杂。
    let latin = &profile.address.latin;
    let address = child_object(org, "Address");
    if !latin.street.is_empty() {
        set_string(address, "Street1", &latin.street);
        set_string(address, "City", &latin.city);
        set_string(address, "State", &latin.state);
        set_string(address, "Country", &latin.country);
    }
    set_if_present(address, "PostalCode", &profile.postal_code);
}

/// 语言节点可能是列表、以 "0" 为键的对象或普通对象，只清空首条的 Products。
fn clear_products(org: &mut Map<String, Value>) {
    let Some(node) = org.get_mut("LanguageByManufacturingPersonnel") else {
        return;
    };
    let target = match node {
        Value::Array(items) => items.first_mut().and_then(Value::as_object_mut),
        Value::Object(map) => {
            if map.get("0").is_some_and(Value::is_object) {
                map.get_mut("0").and_then(Value::as_object_mut)
            } else {
                Some(map)
            }
        }
        _ => None,
    };
    if let Some(target) = target {
        set_string(target, "Products", "");
    }
}

fn write_sites(document: &mut Value, fields: &ExtractedFields) {
    let org = ensure_object(document, &["OrganizationInformation"]);
    for category in SiteCategory::ALL {
        let extracted = fields.sites.get(category);
        if let Some(sites) = extracted {
            let values = sites.iter().map(|site| site.to_value()).collect();
            org.insert(category.list_key().to_string(), Value::Array(values));
        }
        let flag = if extracted.is_some_and(|sites| !sites.is_empty()) {
            SITE_PRESENT
        } else {
            SITE_ABSENT
        };
        set_string(org, category.flag_key(), flag);
    }
}

/// 抽取到顾客时整体替换列表，否则保留模板中的顾客。
fn write_customers(document: &mut Value, customers: &[CustomerRecord]) {
    if customers.is_empty() {
        return;
    }
    let values = customers.iter().map(customer_value).collect();
    let info = ensure_object(document, &["CustomerInformation"]);
    info.insert("Customers".to_string(), Value::Array(values));
}

fn customer_value(customer: &CustomerRecord) -> Value {
    let mut csr = Map::new();
    set_string(&mut csr, "Id", &Uuid::new_v4().to_string());
    set_if_present(&mut csr, "Name", &customer.name);
    set_if_present(&mut csr, "SupplierCode", &customer.supplier_code);
    set_if_present(&mut csr, "NameCSRDocument", &customer.csr_document_name);
    set_if_present(&mut csr, "DateCSRDocument", &customer.csr_document_date);

    let mut entry = Map::new();
    set_string(&mut entry, "Id", &Uuid::new_v4().to_string());
    set_if_present(&mut entry, "Name", &customer.name);
    set_if_present(&mut entry, "SupplierCode", &customer.supplier_code);
    entry.insert("Csrs".to_string(), Value::Array(vec![Value::Object(csr)]));
    Value::Object(entry)
}

fn write_documents(document: &mut Value, names: &[String]) {
    if names.is_empty() {
        return;
    }
    let requirements = ensure_object(document, &["Stage1DocumentedRequirements"]);
    let clause_documents = ensure_list(requirements, "IatfClauseDocuments");
    let entries = names
        .iter()
        .map(|name| {
            let mut entry = Map::new();
            set_string(&mut entry, "DocumentName", name);
            entry
        })
        .collect();
    merge_positional(clause_documents, entries);
}

fn write_processes(document: &mut Value, fields: &ExtractedFields) {
    let processes = fields
        .processes
        .iter()
        .map(|process| process.to_value(&fields.auditor.card_id))
        .collect();
    ensure_object(document, &[]).insert("Processes".to_string(), Value::Array(processes));
}

fn write_results(document: &mut Value, dates: &AuditDates) {
    let results = ensure_object(document, &["Results"]);
    set_if_present(results, "DateNextScheduledAudit", &dates.next_audit);
    let report = child_object(results, "AuditReportFinal");
    set_if_present(report, "Date", &dates.end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::address::decompose_latin_address;
    use crate::extract::sites::{ExtractedSite, SiteAddress};
    use crate::extract::SiteLists;

    fn customer(name: &str) -> CustomerRecord {
        CustomerRecord {
            name: name.to_string(),
            supplier_code: format!("{name}-code"),
            ..CustomerRecord::default()
        }
    }

    fn site(name: &str) -> ExtractedSite {
        ExtractedSite {
            id: format!("id-{name}"),
            site_name: name.to_string(),
            comments: None,
            usi: None,
            employee_count: Some("12".to_string()),
            native_address: SiteAddress::default(),
            latin_address: SiteAddress::default(),
        }
    }

    #[test]
    fn template_is_not_mutated() {
        let template = json!({ "AuditData": { "AuditTeam": [] }, "Untouched": [1, 2] });
        let snapshot = template.clone();
        let merged = merge_document(&template, &ExtractedFields::default(), &MergeSettings::default());
        assert_eq!(template, snapshot);
        assert_eq!(merged["Untouched"], json!([1, 2]));
        assert!(merged["uuid"].is_string());
        assert!(merged["created"].as_i64().is_some_and(|created| created > 0));
    }

    #[test]
    fn customers_fully_replace_template_list() {
        let template = json!({
            "CustomerInformation": {
                "Customers": [{ "Name": "old1" }, { "Name": "old2" }],
                "Note": "keep"
            }
        });
        let fields = ExtractedFields {
            customers: vec![customer("新顾客")],
            ..ExtractedFields::default()
        };
        let merged = merge_document(&template, &fields, &MergeSettings::default());
        let customers = merged["CustomerInformation"]["Customers"].as_array().unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0]["Name"], "新顾客");
        assert_eq!(customers[0]["Csrs"][0]["SupplierCode"], "新顾客-code");
        assert!(customers[0]["Csrs"][0].get("NameCSRDocument").is_none());
        assert_eq!(merged["CustomerInformation"]["Note"], "keep");
    }

    #[test]
    fn no_customers_keeps_template_list() {
        let template = json!({ "CustomerInformation": { "Customers": [{ "Name": "old" }] } });
        let merged = merge_document(&template, &ExtractedFields::default(), &MergeSettings::default());
        assert_eq!(merged["CustomerInformation"]["Customers"], json!([{ "Name": "old" }]));
    }

    #[test]
    fn documents_merge_by_position() {
        let template = json!({
            "Stage1DocumentedRequirements": {
                "IatfClauseDocuments": [
                    { "Clause": "4.1", "DocumentName": "a" },
                    { "Clause": "4.2", "DocumentName": "b" },
                    { "Clause": "4.3", "DocumentName": "c" },
                    { "Clause": "4.4", "DocumentName": "d" },
                    { "Clause": "4.5", "DocumentName": "e" }
                ]
            }
        });
        let fields = ExtractedFields {
            documents: vec!["QM-01".to_string(), "QP-02".to_string(), "QP-03".to_string()],
            ..ExtractedFields::default()
        };
        let merged = merge_document(&template, &fields, &MergeSettings::default());
        let docs = merged["Stage1DocumentedRequirements"]["IatfClauseDocuments"]
            .as_array()
            .unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0], json!({ "Clause": "4.1", "DocumentName": "QM-01" }));
        assert_eq!(docs[2], json!({ "Clause": "4.3", "DocumentName": "QP-03" }));
        assert_eq!(docs[3], json!({ "Clause": "4.4", "DocumentName": "d" }));
        assert_eq!(docs[4], json!({ "Clause": "4.5", "DocumentName": "e" }));
    }

    #[test]
    fn site_flags_follow_extraction_results() {
        let fields = ExtractedFields {
            sites: SiteLists {
                extended_manufacturing: Some(vec![site("一厂"), site("二厂")]),
                providing_support: Some(Vec::new()),
                receiving_support: None,
            },
            ..ExtractedFields::default()
        };
        let template = json!({ "OrganizationInformation": { "ReceivingSupportSites": ["tpl"] } });
        let merged = merge_document(&template, &fields, &MergeSettings::default());
        let org = &merged["OrganizationInformation"];
        assert_eq!(org["HasExtendedManufacturingSites"], "1");
        assert_eq!(org["ExtendedManufacturingSites"][1]["SiteName"], "二厂");
        assert_eq!(org["ExtendedManufacturingSites"][0]["TotalNumberEmployees"], "12");
        assert_eq!(org["HasProvidingSupportSites"], "0");
        assert_eq!(org["ProvidingSupportSites"], json!([]));
        assert_eq!(org["HasReceivingSupportSites"], "0");
        assert_eq!(org["ReceivingSupportSites"], json!(["tpl"]));
    }

    #[test]
    fn scalars_write_only_when_present() {
        let template = json!({
            "OrganizationInformation": { "OrganizationName": "模板公司", "Telephone": "000" },
            "Results": { "AuditReportFinal": { "Date": "tpl" } }
        });
        let mut fields = ExtractedFields::default();
        fields.organization.telephone = "0755-1".to_string();
        let merged = merge_document(&template, &fields, &MergeSettings::default());
        let org = &merged["OrganizationInformation"];
        assert_eq!(org["OrganizationName"], "模板公司");
        assert_eq!(org["Telephone"], "0755-1");
        assert_eq!(org["AddressNative"]["Country"], "中国");
        assert_eq!(org["AddressNative"]["City"], "");
        assert_eq!(merged["Results"]["AuditReportFinal"]["Date"], "tpl");
        assert_eq!(merged["AuditData"]["CbIdentificationNo"], "");
        assert_eq!(merged["Processes"], json!([]));
    }

    #[test]
    fn latin_address_replaces_template_block_as_a_unit() {
        let template = json!({
            "OrganizationInformation": {
                "Address": {
                    "Street1": "Old Street 9",
                    "City": "OldCity",
                    "State": "OldState",
                    "Country": "Germany",
                    "PostalCode": "10115"
                }
            }
        });
        let mut fields = ExtractedFields::default();
        fields.organization.address.latin = decompose_latin_address("88 New Road Suzhou");
        let merged = merge_document(&template, &fields, &MergeSettings::default());
        assert_eq!(
            merged["OrganizationInformation"]["Address"],
            json!({
                "Street1": "88 New Road Suzhou",
                "City": "",
                "State": "",
                "Country": "",
                "PostalCode": "10115"
            })
        );

        let untouched = merge_document(&template, &ExtractedFields::default(), &MergeSettings::default());
        assert_eq!(
            untouched["OrganizationInformation"]["Address"],
            template["OrganizationInformation"]["Address"]
        );
    }

    #[test]
    fn audit_team_merges_into_first_entry() {
        let template = json!({
            "AuditData": {
                "AuditTeam": [
                    { "Role": "Lead", "Name": "tpl" },
                    { "Role": "Member", "Name": "second" }
                ]
            }
        });
        let fields = ExtractedFields {
            auditor: AuditorIdentity {
                name: "Wei ZHANG".to_string(),
                ccaa_number: "123".to_string(),
                card_id: "5-ABC".to_string(),
            },
            dates: AuditDates {
                start: "2024-03-05T00:00:00.000Z".to_string(),
                end: "2024-03-06T00:00:00.000Z".to_string(),
                next_audit: "2024-04-20T00:00:00.000Z".to_string(),
            },
            ..ExtractedFields::default()
        };
        let merged = merge_document(&template, &fields, &MergeSettings::default());
        let team = merged["AuditData"]["AuditTeam"].as_array().unwrap();
        assert_eq!(team.len(), 2);
        assert_eq!(team[0]["Role"], "Lead");
        assert_eq!(team[0]["Name"], "Wei ZHANG");
        assert_eq!(team[0]["AuditDaysPerformed"], 1.5);
        assert_eq!(team[0]["DatesOnSite"][1]["Day"], 0.5);
        assert_eq!(team[1]["Name"], "second");
        assert_eq!(merged["AuditData"]["AuditDate"]["Start"], "2024-03-05T00:00:00.000Z");
        assert_eq!(merged["Results"]["DateNextScheduledAudit"], "2024-04-20T00:00:00.000Z");
        assert_eq!(merged["Results"]["AuditReportFinal"]["Date"], "2024-03-06T00:00:00.000Z");
    }

    #[test]
    fn language_products_are_cleared_in_every_shape() {
        for (shape, pointer) in [
            (json!([{ "Products": "x", "Lang": "zh" }]), "/0/Products"),
            (json!({ "0": { "Products": "x" } }), "/0/Products"),
            (json!({ "Products": "x" }), "/Products"),
        ] {
            let template = json!({ "OrganizationInformation": { "LanguageByManufacturingPersonnel": shape } });
            let merged = merge_document(&template, &ExtractedFields::default(), &MergeSettings::default());
            let node = &merged["OrganizationInformation"]["LanguageByManufacturingPersonnel"];
            assert_eq!(node.pointer(pointer), Some(&json!("")));
        }
    }
}
