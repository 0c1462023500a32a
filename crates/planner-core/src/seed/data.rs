//! The starter catalog loaded into an empty store.

pub struct SeedUseCase {
    pub text: &'static str,
    pub prerequisites: &'static [&'static str],
}

pub struct SeedSolution {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub use_cases: &'static [SeedUseCase],
    pub prerequisites: &'static [&'static str],
}

const fn uc(text: &'static str, prerequisites: &'static [&'static str]) -> SeedUseCase {
    SeedUseCase {
        text,
        prerequisites,
    }
}

pub static STARTER_SOLUTIONS: &[SeedSolution] = &[
    SeedSolution {
        name: "Privileged Remote Access (PRA)",
        description: "Secure remote access for vendors, IT teams, and service desks without VPN.",
        icon: "🔐",
        use_cases: &[
            uc(
                "Secure vendor access to internal systems",
                &["Network access configured for vendor endpoints", "Vault credentials for target systems"],
            ),
            uc(
                "IT help desk remote support",
                &["Representative console installed", "Active Directory integration configured"],
            ),
            uc(
                "Session recording and auditing",
                &["Storage allocated for session recordings", "Audit policy configured"],
            ),
            uc(
                "Credential injection without exposure",
                &["Vault credentials created", "Target systems configured for credential injection"],
            ),
            uc(
                "Jump host replacement",
                &["Network access from PRA appliance to target systems", "Jump configurations migrated"],
            ),
            uc(
                "Multi-cloud infrastructure access",
                &["Cloud credentials stored in vault", "Cloud network access configured"],
            ),
        ],
        prerequisites: &[
            "Virtual appliance deployment capability (VMware, Hyper-V, or cloud)",
            "Network access from appliance to target systems (SSH/RDP/VNC ports)",
            "SSL certificate for secure access portal",
            "DNS entry for public/private access URL",
            "Active Directory or LDAP for user authentication (optional but recommended)",
            "Firewall rules to allow outbound HTTPS (443) for cloud services",
        ],
    },
    SeedSolution {
        name: "Remote Support (RS)",
        description: "Enterprise-grade remote support for IT help desks and customer support teams.",
        icon: "🖥️",
        use_cases: &[
            uc(
                "End-user desktop support",
                &["Representative console installed", "End-user firewall exceptions configured"],
            ),
            uc(
                "Unattended access to servers and workstations",
                &["Jump Client deployed", "Unattended access policy configured"],
            ),
            uc(
                "Cross-platform support (Windows, Mac, Linux)",
                &["Cross-platform agents tested", "Platform-specific configurations verified"],
            ),
            uc(
                "Mobile device support",
                &["Mobile app installed", "Mobile device policies configured"],
            ),
            uc(
                "Integration with ITSM tools (ServiceNow, Jira)",
                &["API access configured", "ITSM integration credentials provided"],
            ),
            uc(
                "Co-browsing for web application support",
                &["Web application access verified", "Co-browse feature enabled"],
            ),
        ],
        prerequisites: &[
            "Cloud-hosted or on-premise appliance deployment",
            "Outbound internet access for cloud relay (if cloud-hosted)",
            "Representative console installation on support agent machines",
            "End-user firewall exceptions for Jump Client (if unattended access)",
            "SAML/SSO integration for single sign-on (optional)",
            "API access for ITSM integrations",
        ],
    },
    SeedSolution {
        name: "Endpoint Privilege Management for Windows",
        description: "Remove local admin rights while enabling users to run approved applications.",
        icon: "🛡️",
        use_cases: &[
            uc(
                "Remove local admin rights from end users",
                &["EPM agent deployed to pilot group", "Baseline policy created"],
            ),
            uc(
                "Application elevation with policy-based approval",
                &["Application whitelist configured", "Approval workflow setup"],
            ),
            uc(
                "Just-in-time privilege elevation",
                &["JIT policy configured", "Elevation timeout settings defined"],
            ),
            uc(
                "Self-service elevation with business justification",
                &["Self-service portal configured", "Justification requirements defined"],
            ),
            uc(
                "Trusted application lists (whitelisting)",
                &["Application inventory completed", "Trust policies defined"],
            ),
            uc(
                "PowerShell and script control",
                &["Script execution policies configured", "PowerShell restrictions defined"],
            ),
        ],
        prerequisites: &[
            "Windows endpoints for agent deployment (Windows 10/11, Server 2016+)",
            "Software deployment tool (SCCM, Intune, GPO)",
            "EPM Console/Policy Editor installation",
            "Test group of endpoints for pilot deployment",
            "Admin accounts for policy configuration",
            "Logging/SIEM integration for audit events (optional)",
        ],
    },
    SeedSolution {
        name: "Endpoint Privilege Management for Mac",
        description: "Enforce least privilege on macOS devices without hindering productivity.",
        icon: "🍎",
        use_cases: &[
            uc(
                "Remove local admin rights from Mac users",
                &["EPM agent deployed via MDM", "PPPC approvals configured"],
            ),
            uc(
                "Application elevation on macOS",
                &["macOS application policies created", "Elevation rules defined"],
            ),
            uc(
                "sudo command control and elevation",
                &["sudo policies configured", "Command restrictions defined"],
            ),
            uc(
                "Preference pane and system extension management",
                &["System extension policies configured", "Full Disk Access granted"],
            ),
            uc(
                "Integration with Jamf or other MDM",
                &["MDM integration configured", "Policy sync verified"],
            ),
        ],
        prerequisites: &[
            "macOS endpoints (macOS 11+) for agent deployment",
            "MDM solution (Jamf Pro, Mosyle, Kandji) for deployment",
            "Apple Business Manager enrollment (recommended)",
            "Test group of Mac devices for pilot",
            "Full Disk Access and other PPPC approvals via MDM",
        ],
    },
    SeedSolution {
        name: "Password Safe",
        description: "Privileged credential and session management for enterprise environments.",
        icon: "🔑",
        use_cases: &[
            uc(
                "Automated password rotation for service accounts",
                &["Service accounts identified", "Rotation policies configured"],
            ),
            uc(
                "Privileged session recording and keystroke logging",
                &["Storage allocated for recordings", "Recording policies enabled"],
            ),
            uc(
                "SSH key management",
                &["SSH keys discovered", "Key rotation policies configured"],
            ),
            uc(
                "Application-to-application password management (A2A)",
                &["API access configured", "Application accounts registered"],
            ),
            uc(
                "Secrets management for DevOps pipelines",
                &["DevOps integration configured", "Secret retrieval API setup"],
            ),
            uc(
                "Just-in-time access workflows with approvals",
                &["Approval workflow configured", "Access policies defined"],
            ),
            uc(
                "Discovery of privileged accounts across the network",
                &["Network access configured", "Discovery rules defined"],
            ),
        ],
        prerequisites: &[
            "Virtual appliance or hardware deployment",
            "Service accounts with permissions to manage target systems",
            "Network access to managed systems (LDAP, WinRM, SSH)",
            "SSL certificate for web portal",
            "Active Directory integration for authentication",
            "Database connectivity for secrets storage",
            "API access for DevOps integrations (optional)",
        ],
    },
    SeedSolution {
        name: "Identity Security Insights",
        description: "Visibility and analytics for identity-related risks across the enterprise.",
        icon: "📊",
        use_cases: &[
            uc(
                "Privileged account discovery and inventory",
                &["AD read access granted", "Discovery scope defined"],
            ),
            uc(
                "Identity attack path analysis",
                &["Identity data collected", "Attack path rules configured"],
            ),
            uc(
                "Active Directory security posture assessment",
                &["AD connector configured", "Assessment baseline defined"],
            ),
            uc(
                "Cloud identity risk visibility (Azure AD, AWS IAM)",
                &["Cloud connectors configured", "Cloud read permissions granted"],
            ),
            uc(
                "Continuous compliance monitoring",
                &["Compliance rules configured", "Alert forwarding setup"],
            ),
        ],
        prerequisites: &[
            "Read access to Active Directory",
            "Cloud connector configuration (Azure, AWS, GCP)",
            "Network access from collector to identity sources",
            "Service account with appropriate read permissions",
            "SIEM integration for alert forwarding (optional)",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn six_uniquely_named_solutions() {
        assert_eq!(STARTER_SOLUTIONS.len(), 6);
        let names: HashSet<_> = STARTER_SOLUTIONS.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn every_solution_has_use_cases_and_prerequisites() {
        for s in STARTER_SOLUTIONS {
            assert!(!s.use_cases.is_empty(), "{} has no use cases", s.name);
            assert!(!s.prerequisites.is_empty(), "{} has no prerequisites", s.name);
        }
    }
}
