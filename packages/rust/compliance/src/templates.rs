//! Canonical mandatory clause texts appended to non-compliant contracts.
//!
//! The first line is the clause heading; following lines are paragraphs.

pub(crate) const HIPAA_DATA_PRIVACY: &str = "\
Data Privacy Protection Right:
The Parties shall ensure that all protected health information and personal data processed under this Agreement are handled in accordance with applicable laws and standards (including HIPAA where applicable). Data subjects shall have appropriate rights to access, correction and to request deletion where applicable. Parties shall implement appropriate technical and organisational measures to protect personal data.";

pub(crate) const GDPR_DATA_PROTECTION: &str = "\
GDPR Data Protection Clause:
The Parties agree to comply with the EU General Data Protection Regulation (GDPR) where applicable. The Controller/Processor shall implement appropriate technical and organisational measures to ensure a level of security appropriate to the risk, adhere to data subject rights, and cooperate on breach notification and DPIA requirements.";
