//! A2P registration form draft.
//!
//! The draft mirrors the submission's input shape before it is mapped to the
//! persisted record. It lives only for one form session.

use serde::{Deserialize, Serialize};
use shared::validation::{validate_other_specified, OTHER_CHOICE};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::a2p_submission::NewA2PSubmission;

/// Country preselected on a fresh draft.
pub const DEFAULT_COUNTRY: &str = "United States";

pub const JOB_TITLES: &[&str] = &["Owner", "CEO", "Director", "Manager", OTHER_CHOICE];

pub const LEGAL_ENTITY_TYPES: &[&str] = &[
    "Corporation",
    "LLC",
    "Sole Proprietor",
    "Partnership",
    "Non-Profit",
    OTHER_CHOICE,
];

pub const BUSINESS_INDUSTRIES: &[&str] = &[
    "Healthcare",
    "Legal",
    "Finance",
    "Real Estate",
    "Home Services",
    "Marketing/Advertising",
    "Technology",
    "Retail",
    "Education",
    OTHER_CHOICE,
];

/// The four collapsible sections of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormSection {
    LegalBusinessDetails = 1,
    AuthorisedRepresentative = 2,
    BusinessClassification = 3,
    ComplianceAssets = 4,
}

impl FormSection {
    pub const ALL: [FormSection; 4] = [
        FormSection::LegalBusinessDetails,
        FormSection::AuthorisedRepresentative,
        FormSection::BusinessClassification,
        FormSection::ComplianceAssets,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FormSection::LegalBusinessDetails => "LEGAL BUSINESS DETAILS",
            FormSection::AuthorisedRepresentative => "AUTHORISED REPRESENTATIVE",
            FormSection::BusinessClassification => "BUSINESS CLASSIFICATION",
            FormSection::ComplianceAssets => "COMPLIANCE ASSETS",
        }
    }

    /// Fields rendered inside this section, in display order.
    pub fn fields(&self) -> Vec<FormField> {
        FormField::ALL
            .iter()
            .copied()
            .filter(|f| f.section() == *self)
            .collect()
    }
}

/// Every editable field of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    LegalBusinessName,
    StreetAddress,
    City,
    StateProvince,
    ZipPostalCode,
    Country,
    BusinessPhone,
    BusinessEmail,
    BusinessWebsite,
    FirstName,
    LastName,
    DirectEmail,
    JobTitle,
    JobTitleOther,
    DirectPhone,
    LegalEntityType,
    LegalEntityOther,
    BusinessIndustry,
    IndustryOther,
    TaxIdEin,
    PrivacyPolicyUrl,
    TermsConditionsUrl,
    OptInFormUrl,
}

impl FormField {
    pub const ALL: [FormField; 23] = [
        FormField::LegalBusinessName,
        FormField::StreetAddress,
        FormField::City,
        FormField::StateProvince,
        FormField::ZipPostalCode,
        FormField::Country,
        FormField::BusinessPhone,
        FormField::BusinessEmail,
        FormField::BusinessWebsite,
        FormField::FirstName,
        FormField::LastName,
        FormField::DirectEmail,
        FormField::JobTitle,
        FormField::JobTitleOther,
        FormField::DirectPhone,
        FormField::LegalEntityType,
        FormField::LegalEntityOther,
        FormField::BusinessIndustry,
        FormField::IndustryOther,
        FormField::TaxIdEin,
        FormField::PrivacyPolicyUrl,
        FormField::TermsConditionsUrl,
        FormField::OptInFormUrl,
    ];

    /// Fields that must be non-empty for the draft to be submittable.
    pub const REQUIRED: [FormField; 19] = [
        FormField::LegalBusinessName,
        FormField::StreetAddress,
        FormField::City,
        FormField::StateProvince,
        FormField::ZipPostalCode,
        FormField::Country,
        FormField::BusinessPhone,
        FormField::BusinessEmail,
        FormField::FirstName,
        FormField::LastName,
        FormField::DirectEmail,
        FormField::JobTitle,
        FormField::DirectPhone,
        FormField::LegalEntityType,
        FormField::BusinessIndustry,
        FormField::TaxIdEin,
        FormField::PrivacyPolicyUrl,
        FormField::TermsConditionsUrl,
        FormField::OptInFormUrl,
    ];

    /// Draft key, matching the serialized field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::LegalBusinessName => "legalBusinessName",
            FormField::StreetAddress => "streetAddress",
            FormField::City => "city",
            FormField::StateProvince => "stateProvince",
            FormField::ZipPostalCode => "zipPostalCode",
            FormField::Country => "country",
            FormField::BusinessPhone => "businessPhone",
            FormField::BusinessEmail => "businessEmail",
            FormField::BusinessWebsite => "businessWebsite",
            FormField::FirstName => "firstName",
            FormField::LastName => "lastName",
            FormField::DirectEmail => "directEmail",
            FormField::JobTitle => "jobTitle",
            FormField::JobTitleOther => "jobTitleOther",
            FormField::DirectPhone => "directPhone",
            FormField::LegalEntityType => "legalEntityType",
            FormField::LegalEntityOther => "legalEntityOther",
            FormField::BusinessIndustry => "businessIndustry",
            FormField::IndustryOther => "industryOther",
            FormField::TaxIdEin => "taxIdEin",
            FormField::PrivacyPolicyUrl => "privacyPolicyUrl",
            FormField::TermsConditionsUrl => "termsConditionsUrl",
            FormField::OptInFormUrl => "optInFormUrl",
        }
    }

    pub fn section(&self) -> FormSection {
        use FormField::*;
        match self {
            LegalBusinessName | StreetAddress | City | StateProvince | ZipPostalCode | Country
            | BusinessPhone | BusinessEmail | BusinessWebsite => FormSection::LegalBusinessDetails,
            FirstName | LastName | DirectEmail | JobTitle | JobTitleOther | DirectPhone => {
                FormSection::AuthorisedRepresentative
            }
            LegalEntityType | LegalEntityOther | BusinessIndustry | IndustryOther | TaxIdEin => {
                FormSection::BusinessClassification
            }
            PrivacyPolicyUrl | TermsConditionsUrl | OptInFormUrl => FormSection::ComplianceAssets,
        }
    }

    pub fn is_required(&self) -> bool {
        FormField::REQUIRED.contains(self)
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s || snake_case(f.as_str()) == s)
            .ok_or_else(|| format!("Unknown form field: {}", s))
    }
}

/// `legalBusinessName` -> `legal_business_name`, the Rust field name.
fn snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-progress registration form values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    // Section 1: Legal Business Details
    #[validate(length(min = 1, message = "Legal business name is required"))]
    pub legal_business_name: String,
    #[validate(length(min = 1, message = "Street address is required"))]
    pub street_address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State / province is required"))]
    pub state_province: String,
    #[validate(length(min = 1, message = "ZIP / postal code is required"))]
    pub zip_postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "Business phone is required"))]
    pub business_phone: String,
    #[validate(length(min = 1, message = "Business email is required"))]
    pub business_email: String,
    pub business_website: String,

    // Section 2: Authorised Representative
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Direct email is required"))]
    pub direct_email: String,
    #[validate(length(min = 1, message = "Job title is required"))]
    pub job_title: String,
    pub job_title_other: String,
    #[validate(length(min = 1, message = "Direct phone is required"))]
    pub direct_phone: String,

    // Section 3: Business Classification
    #[validate(length(min = 1, message = "Legal entity type is required"))]
    pub legal_entity_type: String,
    pub legal_entity_other: String,
    #[validate(length(min = 1, message = "Business industry is required"))]
    pub business_industry: String,
    pub industry_other: String,
    #[validate(length(min = 1, message = "Tax ID / EIN is required"))]
    pub tax_id_ein: String,

    // Section 4: Compliance Assets
    #[validate(length(min = 1, message = "Privacy policy URL is required"))]
    pub privacy_policy_url: String,
    #[validate(length(min = 1, message = "Terms & conditions URL is required"))]
    pub terms_conditions_url: String,
    #[validate(length(min = 1, message = "Opt-in form URL is required"))]
    pub opt_in_form_url: String,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            legal_business_name: String::new(),
            street_address: String::new(),
            city: String::new(),
            state_province: String::new(),
            zip_postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            business_phone: String::new(),
            business_email: String::new(),
            business_website: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            direct_email: String::new(),
            job_title: String::new(),
            job_title_other: String::new(),
            direct_phone: String::new(),
            legal_entity_type: String::new(),
            legal_entity_other: String::new(),
            business_industry: String::new(),
            industry_other: String::new(),
            tax_id_ein: String::new(),
            privacy_policy_url: String::new(),
            terms_conditions_url: String::new(),
            opt_in_form_url: String::new(),
        }
    }
}

impl FormDraft {
    /// Fully populated sample record used to prefill the form.
    pub fn sample() -> Self {
        Self {
            legal_business_name: "Acme Solutions LLC".to_string(),
            street_address: "123 Innovation Drive".to_string(),
            city: "Austin".to_string(),
            state_province: "Texas".to_string(),
            zip_postal_code: "73301".to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            business_phone: "+1 (555) 123-4567".to_string(),
            business_email: "info@acmesolutions.com".to_string(),
            business_website: "https://acmesolutions.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            direct_email: "john.smith@acmesolutions.com".to_string(),
            job_title: "CEO".to_string(),
            job_title_other: String::new(),
            direct_phone: "+1 (555) 987-6543".to_string(),
            legal_entity_type: "LLC".to_string(),
            legal_entity_other: String::new(),
            business_industry: "Technology".to_string(),
            industry_other: String::new(),
            tax_id_ein: "12-3456789".to_string(),
            privacy_policy_url: "https://acmesolutions.com/privacy".to_string(),
            terms_conditions_url: "https://acmesolutions.com/terms".to_string(),
            opt_in_form_url: "https://acmesolutions.com/opt-in".to_string(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        self.slot(field)
    }

    /// Merges a single value into the draft. No validation runs here.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Runs required-field and "Other" companion checks.
    pub fn validation_errors(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        for (parent, other) in [
            (FormField::JobTitle, FormField::JobTitleOther),
            (FormField::LegalEntityType, FormField::LegalEntityOther),
            (FormField::BusinessIndustry, FormField::IndustryOther),
        ] {
            if let Err(e) =
                validate_other_specified(other.as_str(), self.get(parent), self.get(other))
            {
                errors.add(other.as_str(), e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_ok()
    }

    /// Names of the fields currently failing validation, in camelCase.
    pub fn invalid_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = match self.validation_errors() {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .field_errors()
                .keys()
                .map(|k| match k.parse::<FormField>() {
                    Ok(field) => field.as_str().to_string(),
                    Err(_) => k.to_string(),
                })
                .collect(),
        };
        fields.sort();
        fields
    }

    /// Builds the persisted-record shape.
    ///
    /// Choice fields set to "Other" take their companion free-text value, and
    /// blank website and compliance URLs become `None`.
    pub fn to_submission(&self, client_id: Uuid) -> NewA2PSubmission {
        NewA2PSubmission {
            client_id,
            legal_business_name: self.legal_business_name.clone(),
            street_address: self.street_address.clone(),
            city: self.city.clone(),
            state: self.state_province.clone(),
            zip: self.zip_postal_code.clone(),
            country: self.country.clone(),
            business_phone: self.business_phone.clone(),
            business_email: self.business_email.clone(),
            business_website: non_blank(&self.business_website),
            rep_first_name: self.first_name.clone(),
            rep_last_name: self.last_name.clone(),
            rep_email: self.direct_email.clone(),
            rep_job_title: resolve_other(&self.job_title, &self.job_title_other),
            rep_phone: self.direct_phone.clone(),
            business_type: resolve_other(&self.legal_entity_type, &self.legal_entity_other),
            business_industry: resolve_other(&self.business_industry, &self.industry_other),
            tax_id: self.tax_id_ein.clone(),
            privacy_policy_url: non_blank(&self.privacy_policy_url),
            terms_url: non_blank(&self.terms_conditions_url),
            opt_in_url: non_blank(&self.opt_in_form_url),
        }
    }

    fn slot(&self, field: FormField) -> &String {
        match field {
            FormField::LegalBusinessName => &self.legal_business_name,
            FormField::StreetAddress => &self.street_address,
            FormField::City => &self.city,
            FormField::StateProvince => &self.state_province,
            FormField::ZipPostalCode => &self.zip_postal_code,
            FormField::Country => &self.country,
            FormField::BusinessPhone => &self.business_phone,
            FormField::BusinessEmail => &self.business_email,
            FormField::BusinessWebsite => &self.business_website,
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::DirectEmail => &self.direct_email,
            FormField::JobTitle => &self.job_title,
            FormField::JobTitleOther => &self.job_title_other,
            FormField::DirectPhone => &self.direct_phone,
            FormField::LegalEntityType => &self.legal_entity_type,
            FormField::LegalEntityOther => &self.legal_entity_other,
            FormField::BusinessIndustry => &self.business_industry,
            FormField::IndustryOther => &self.industry_other,
            FormField::TaxIdEin => &self.tax_id_ein,
            FormField::PrivacyPolicyUrl => &self.privacy_policy_url,
            FormField::TermsConditionsUrl => &self.terms_conditions_url,
            FormField::OptInFormUrl => &self.opt_in_form_url,
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::LegalBusinessName => &mut self.legal_business_name,
            FormField::StreetAddress => &mut self.street_address,
            FormField::City => &mut self.city,
            FormField::StateProvince => &mut self.state_province,
            FormField::ZipPostalCode => &mut self.zip_postal_code,
            FormField::Country => &mut self.country,
            FormField::BusinessPhone => &mut self.business_phone,
            FormField::BusinessEmail => &mut self.business_email,
            FormField::BusinessWebsite => &mut self.business_website,
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::DirectEmail => &mut self.direct_email,
            FormField::JobTitle => &mut self.job_title,
            FormField::JobTitleOther => &mut self.job_title_other,
            FormField::DirectPhone => &mut self.direct_phone,
            FormField::LegalEntityType => &mut self.legal_entity_type,
            FormField::LegalEntityOther => &mut self.legal_entity_other,
            FormField::BusinessIndustry => &mut self.business_industry,
            FormField::IndustryOther => &mut self.industry_other,
            FormField::TaxIdEin => &mut self.tax_id_ein,
            FormField::PrivacyPolicyUrl => &mut self.privacy_policy_url,
            FormField::TermsConditionsUrl => &mut self.terms_conditions_url,
            FormField::OptInFormUrl => &mut self.opt_in_form_url,
        }
    }
}

/// Returns true when every required field is filled in.
pub fn validate_draft(draft: &FormDraft) -> bool {
    draft.is_valid()
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn resolve_other(choice: &str, other: &str) -> String {
    if choice == OTHER_CHOICE {
        other.to_string()
    } else {
        choice.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft_is_invalid() {
        let draft = FormDraft::default();
        assert_eq!(draft.country, "United States");
        assert!(!validate_draft(&draft));
        // Everything required except the preselected country is missing.
        assert_eq!(draft.invalid_fields().len(), 18);
    }

    #[test]
    fn test_sample_draft_is_valid() {
        assert!(validate_draft(&FormDraft::sample()));
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        for field in FormField::REQUIRED {
            let mut draft = FormDraft::sample();
            draft.set(field, "");
            assert!(!draft.is_valid(), "{} should be required", field);
            assert_eq!(draft.invalid_fields(), vec![field.as_str().to_string()]);
        }
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        let mut draft = FormDraft::sample();
        draft.set(FormField::BusinessWebsite, "");
        draft.set(FormField::JobTitleOther, "");
        draft.set(FormField::LegalEntityOther, "");
        draft.set(FormField::IndustryOther, "");
        assert!(draft.is_valid());
    }

    #[test]
    fn test_required_set_has_nineteen_fields() {
        assert_eq!(FormField::REQUIRED.len(), 19);
        let optional: Vec<FormField> = FormField::ALL
            .iter()
            .copied()
            .filter(|f| !f.is_required())
            .collect();
        assert_eq!(
            optional,
            vec![
                FormField::BusinessWebsite,
                FormField::JobTitleOther,
                FormField::LegalEntityOther,
                FormField::IndustryOther
            ]
        );
    }

    #[test]
    fn test_other_without_free_text_is_invalid() {
        let mut draft = FormDraft::sample();
        draft.set(FormField::JobTitle, "Other");
        assert!(!draft.is_valid());
        assert_eq!(draft.invalid_fields(), vec!["jobTitleOther".to_string()]);

        draft.set(FormField::JobTitleOther, "Founder");
        assert!(draft.is_valid());
    }

    #[test]
    fn test_other_substitution_in_submission() {
        let mut draft = FormDraft::sample();
        draft.set(FormField::JobTitle, "Other");
        draft.set(FormField::JobTitleOther, "Founder");
        draft.set(FormField::LegalEntityType, "Other");
        draft.set(FormField::LegalEntityOther, "Cooperative");
        draft.set(FormField::BusinessIndustry, "Other");
        draft.set(FormField::IndustryOther, "Agriculture");

        let submission = draft.to_submission(Uuid::nil());
        assert_eq!(submission.rep_job_title, "Founder");
        assert_eq!(submission.business_type, "Cooperative");
        assert_eq!(submission.business_industry, "Agriculture");
    }

    #[test]
    fn test_other_with_blank_free_text_maps_to_empty() {
        let mut draft = FormDraft::sample();
        draft.set(FormField::JobTitle, "Other");
        let submission = draft.to_submission(Uuid::nil());
        assert_eq!(submission.rep_job_title, "");
    }

    #[test]
    fn test_companion_ignored_when_choice_is_not_other() {
        let mut draft = FormDraft::sample();
        draft.set(FormField::JobTitleOther, "Founder");
        let submission = draft.to_submission(Uuid::nil());
        assert_eq!(submission.rep_job_title, "CEO");
    }

    #[test]
    fn test_blank_urls_become_none() {
        let mut draft = FormDraft::sample();
        draft.set(FormField::BusinessWebsite, "");
        draft.set(FormField::PrivacyPolicyUrl, "");
        draft.set(FormField::TermsConditionsUrl, "");
        draft.set(FormField::OptInFormUrl, "");

        let submission = draft.to_submission(Uuid::nil());
        assert_eq!(submission.business_website, None);
        assert_eq!(submission.privacy_policy_url, None);
        assert_eq!(submission.terms_url, None);
        assert_eq!(submission.opt_in_url, None);
    }

    #[test]
    fn test_filled_urls_are_kept_literally() {
        let submission = FormDraft::sample().to_submission(Uuid::nil());
        assert_eq!(
            submission.business_website.as_deref(),
            Some("https://acmesolutions.com")
        );
        assert_eq!(
            submission.privacy_policy_url.as_deref(),
            Some("https://acmesolutions.com/privacy")
        );
        assert_eq!(
            submission.terms_url.as_deref(),
            Some("https://acmesolutions.com/terms")
        );
        assert_eq!(
            submission.opt_in_url.as_deref(),
            Some("https://acmesolutions.com/opt-in")
        );
    }

    #[test]
    fn test_field_renaming() {
        let client_id = Uuid::new_v4();
        let s = FormDraft::sample().to_submission(client_id);
        assert_eq!(s.client_id, client_id);
        assert_eq!(s.state, "Texas");
        assert_eq!(s.zip, "73301");
        assert_eq!(s.rep_first_name, "John");
        assert_eq!(s.rep_email, "john.smith@acmesolutions.com");
        assert_eq!(s.rep_phone, "+1 (555) 987-6543");
        assert_eq!(s.tax_id, "12-3456789");
    }

    #[test]
    fn test_set_and_get_every_field() {
        let mut draft = FormDraft::default();
        for field in FormField::ALL {
            draft.set(field, field.as_str());
        }
        for field in FormField::ALL {
            assert_eq!(draft.get(field), field.as_str());
        }
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!(
            FormField::from_str("taxIdEin").unwrap(),
            FormField::TaxIdEin
        );
        assert_eq!(
            FormField::from_str("zip_postal_code").unwrap(),
            FormField::ZipPostalCode
        );
        assert!(FormField::from_str("tax_id").is_err());
    }

    #[test]
    fn test_sections_cover_all_fields() {
        let total: usize = FormSection::ALL.iter().map(|s| s.fields().len()).sum();
        assert_eq!(total, FormField::ALL.len());
        assert_eq!(FormSection::ComplianceAssets.fields().len(), 3);
        assert_eq!(
            FormField::JobTitleOther.section(),
            FormSection::AuthorisedRepresentative
        );
    }

    #[test]
    fn test_choice_lists_end_with_other() {
        for list in [JOB_TITLES, LEGAL_ENTITY_TYPES, BUSINESS_INDUSTRIES] {
            assert_eq!(list.last().copied(), Some(OTHER_CHOICE));
        }
    }
}
