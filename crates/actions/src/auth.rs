// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubelet authentication variants (design §4.6): exactly one of
//! bootstrap-token, managed-identity, service-principal, or
//! registration-credential auth must be configured. `validate()` enforces
//! the exclusivity; `resolve()` turns the validated struct into the single
//! variant that's actually set, for the kubeconfig renderer to match on.

use nodeagent_core::{NodeAgentError, Redact, BOOTSTRAP_TOKEN_REDACTED, CLIENT_SECRET_REDACTED};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapTokenAuth {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedIdentityAuth {
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePrincipalAuth {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCredentialAuth {
    pub credential_ref: String,
}

/// Exactly one of these four fields must be `Some` for a valid spec.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KubeletAuthVariants {
    #[serde(default)]
    pub bootstrap_token: Option<BootstrapTokenAuth>,
    #[serde(default)]
    pub managed_identity: Option<ManagedIdentityAuth>,
    #[serde(default)]
    pub service_principal: Option<ServicePrincipalAuth>,
    #[serde(default)]
    pub registration_credential: Option<RegistrationCredentialAuth>,
}

/// The single resolved auth variant, borrowed out of a validated
/// [`KubeletAuthVariants`], for the kubeconfig renderer to match on.
pub enum ResolvedAuth<'a> {
    BootstrapToken(&'a BootstrapTokenAuth),
    ManagedIdentity(&'a ManagedIdentityAuth),
    ServicePrincipal(&'a ServicePrincipalAuth),
    RegistrationCredential(&'a RegistrationCredentialAuth),
}

impl KubeletAuthVariants {
    pub fn validate(&self) -> Result<(), NodeAgentError> {
        let set_count = [
            self.bootstrap_token.is_some(),
            self.managed_identity.is_some(),
            self.service_principal.is_some(),
            self.registration_credential.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        match set_count {
            1 => Ok(()),
            0 => Err(NodeAgentError::InvalidArgument(
                "kubelet auth: exactly one variant must be set, none were".to_string(),
            )),
            _ => Err(NodeAgentError::InvalidArgument(
                "kubelet auth: exactly one variant must be set, multiple were".to_string(),
            )),
        }
    }

    /// `None` unless exactly one variant is set; callers that have already
    /// run `validate()` can treat `None` as unreachable.
    pub fn resolve(&self) -> Option<ResolvedAuth<'_>> {
        if let Some(token) = &self.bootstrap_token {
            return Some(ResolvedAuth::BootstrapToken(token));
        }
        if let Some(identity) = &self.managed_identity {
            return Some(ResolvedAuth::ManagedIdentity(identity));
        }
        if let Some(spn) = &self.service_principal {
            return Some(ResolvedAuth::ServicePrincipal(spn));
        }
        self.registration_credential.as_ref().map(ResolvedAuth::RegistrationCredential)
    }

    pub fn uses_token_auth(&self) -> bool {
        self.bootstrap_token.is_some()
    }
}

impl Redact for KubeletAuthVariants {
    fn redact(&mut self) {
        if let Some(token) = &mut self.bootstrap_token {
            token.token = BOOTSTRAP_TOKEN_REDACTED.to_string();
        }
        if let Some(spn) = &mut self.service_principal {
            spn.client_secret = CLIENT_SECRET_REDACTED.to_string();
        }
    }
}
