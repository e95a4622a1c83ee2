use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// One discovered or enriched posting as carried by `job_found` / `job_analyzed` payloads.
///
/// Every field is optional: a `None` means the producer did not send it (or sent `null`),
/// and merging never lets an absent field erase a stored one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobRecord {
    /// Numeric ids are kept as their decimal text.
    #[serde(
        default,
        deserialize_with = "id_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_normalized: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reasons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_flags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_analysis: Option<SkillsGap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,
    /// Payload keys without a dedicated field (description, posted_date, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `company` arrives either as a bare name or as a profile object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Company {
    Name(String),
    Profile(CompanyProfile),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default, deserialize_with = "null_as_default")]
    pub min: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillsGap {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matching: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing: Vec<String>,
}

/// How far along the pipeline a stored job is. `Analyzed` never reverts to `Found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobStage {
    Found,
    Analyzed,
}

/// Identity of a stored job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKey {
    Url(String),
    Id(String),
    /// Hash of normalised title and company, for producers that send neither url nor id.
    Derived(String),
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKey::Url(url) => write!(f, "url:{url}"),
            JobKey::Id(id) => write!(f, "id:{id}"),
            JobKey::Derived(hash) => write!(f, "derived:{hash}"),
        }
    }
}

impl JobRecord {
    /// Parses a payload object, treating blank `url`/`id` values as absent.
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        let mut record: JobRecord = serde_json::from_value(payload)?;
        record.url = non_blank(record.url);
        record.id = non_blank(record.id);
        Ok(record)
    }

    /// Primary identity: url, else id, else a key derived from title and company.
    pub fn identity(&self) -> Option<JobKey> {
        if let Some(url) = &self.url {
            return Some(JobKey::Url(url.clone()));
        }
        if let Some(id) = &self.id {
            return Some(JobKey::Id(id.clone()));
        }
        self.derived_key()
    }

    fn derived_key(&self) -> Option<JobKey> {
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let company = self.company_display().unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(title.to_lowercase().as_bytes());
        hasher.update([0x1f]);
        hasher.update(company.trim().to_lowercase().as_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(16);
        for byte in digest.iter().take(8) {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        Some(JobKey::Derived(hex))
    }

    /// Keys this record can be found under, in lookup priority order.
    pub(crate) fn lookup_keys(&self) -> Vec<JobKey> {
        let mut keys = Vec::with_capacity(2);
        if let Some(url) = &self.url {
            keys.push(JobKey::Url(url.clone()));
        }
        if let Some(id) = &self.id {
            keys.push(JobKey::Id(id.clone()));
        }
        if keys.is_empty() {
            keys.extend(self.derived_key());
        }
        keys
    }

    /// Field-level last-write-wins: every field present in `incoming` replaces the stored
    /// value wholesale; absent fields keep what was stored.
    pub fn merge_from(&mut self, incoming: JobRecord) {
        let JobRecord {
            id,
            url,
            title,
            company,
            company_name,
            location,
            job_type,
            experience_level,
            match_score,
            salary_normalized,
            salary_range,
            match_reasons,
            red_flags,
            skills_analysis,
            is_remote,
            extra,
        } = incoming;

        overwrite(&mut self.id, id);
        overwrite(&mut self.url, url);
        overwrite(&mut self.title, title);
        overwrite(&mut self.company, company);
        overwrite(&mut self.company_name, company_name);
        overwrite(&mut self.location, location);
        overwrite(&mut self.job_type, job_type);
        overwrite(&mut self.experience_level, experience_level);
        overwrite(&mut self.match_score, match_score);
        overwrite(&mut self.salary_normalized, salary_normalized);
        overwrite(&mut self.salary_range, salary_range);
        overwrite(&mut self.match_reasons, match_reasons);
        overwrite(&mut self.red_flags, red_flags);
        overwrite(&mut self.skills_analysis, skills_analysis);
        overwrite(&mut self.is_remote, is_remote);
        for (key, value) in extra {
            if !value.is_null() {
                self.extra.insert(key, value);
            }
        }
    }

    /// Company name as shown to the operator: profile name, plain name, then `company_name`.
    pub fn company_display(&self) -> Option<&str> {
        let from_company = match &self.company {
            Some(Company::Name(name)) => Some(name.as_str()),
            Some(Company::Profile(profile)) => Some(profile.name.as_str()),
            None => None,
        };
        from_company
            .filter(|name| !name.is_empty())
            .or(self.company_name.as_deref())
    }

    pub fn matching_skills(&self) -> &[String] {
        self.skills_analysis
            .as_ref()
            .map(|gap| gap.matching.as_slice())
            .unwrap_or_default()
    }

    pub fn missing_skills(&self) -> &[String] {
        self.skills_analysis
            .as_ref()
            .map(|gap| gap.missing.as_slice())
            .unwrap_or_default()
    }

    pub fn red_flags(&self) -> &[String] {
        self.red_flags.as_deref().unwrap_or_default()
    }

    pub fn match_reasons(&self) -> &[String] {
        self.match_reasons.as_deref().unwrap_or_default()
    }
}

fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
