//! Query parameters for the portal's advanced-search endpoint.

use url::Url;

/// Parameters for the advanced-search form.
///
/// The portal expects every form key to be present on the GET request even
/// when blank; omitting keys changes the result set. Field order here is the
/// order the form submits them in.
#[derive(Default)]
pub struct AdvancedSearchQuery {
    pub status_id: String,
    pub program_name: String,
    pub effective_date_start: String,
    pub effective_date_end: String,
    pub bind_date_start: String,
    pub bind_date_end: String,
    pub created_date_start: String,
    pub created_date_end: String,
    pub ren: String,
    pub has_esign: String,
    pub has_endorsements: String,
    pub has_claim: String,
    pub has_certificate: String,
    pub item_id: String,
    pub policy_number: String,
    pub agency_name: String,
    pub company_name: String,
    pub applicant_first: String,
    pub applicant_last: String,
    pub applicant_phone: String,
    pub applicant_state: String,
    pub applicant_email: String,
    pub producer_first: String,
    pub producer_last: String,
}

impl AdvancedSearchQuery {
    /// A query that searches by policy number alone.
    pub fn for_policy(policy_number: &str) -> Self {
        Self {
            policy_number: policy_number.to_string(),
            ..Self::default()
        }
    }

    /// Appends the full parameter set to the given URL, returning the
    /// modified URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("status_id", &self.status_id)
            .append_pair("program_name", &self.program_name)
            .append_pair("effective_date_start", &self.effective_date_start)
            .append_pair("effective_date_end", &self.effective_date_end)
            .append_pair("bind_date_start", &self.bind_date_start)
            .append_pair("bind_date_end", &self.bind_date_end)
            .append_pair("created_date_start", &self.created_date_start)
            .append_pair("created_date_end", &self.created_date_end)
            .append_pair("ren", &self.ren)
            .append_pair("has_esign", &self.has_esign)
            .append_pair("has_endorsements", &self.has_endorsements)
            .append_pair("has_claim", &self.has_claim)
            .append_pair("has_certificate", &self.has_certificate)
            .append_pair("item_id", &self.item_id)
            .append_pair("policy_number", &self.policy_number)
            .append_pair("agency_name", &self.agency_name)
            .append_pair("company_name", &self.company_name)
            .append_pair("applicant_first", &self.applicant_first)
            .append_pair("applicant_last", &self.applicant_last)
            .append_pair("applicant_phone", &self.applicant_phone)
            .append_pair("applicant_state", &self.applicant_state)
            .append_pair("applicant_email", &self.applicant_email)
            .append_pair("producer_first", &self.producer_first)
            .append_pair("producer_last", &self.producer_last);
        url
    }
}
