//! Sample server configurations.

/// One section declaring two names with an overridden renewal mode and
/// Must-Staple.
pub const SECTION_SCENARIO: &str = "\
<MDomain example.com www.example.com>
    MDRenewMode always
    MDMustStaple on
</MDomain>
";

/// A configuration touching every global directive.
pub const GLOBAL_SETTINGS: &str = "\
MDStoreDir /var/lib/md
MDPortMap http:8080 443:-
MDHttpProxy http://proxy.internal:3128
MDNotifyCmd /usr/local/bin/md-notify --all
MDChallengeDns01 /usr/local/bin/dns01-hook
MDBaseServer on
MDServerStatus off
MDCertificateStatus off
";

/// Main-server settings, a virtual host and two domain groups.
pub const MIXED_SCOPES: &str = "\
# main server
MDCertificateAuthority https://acme.example/directory
MDRenewMode manual
MDRenewWindow 20%
MDPrivateKeys RSA 3072

MDomain example.org www.example.org auto

<MDomainSet shop.example.org>
    MDMember cart.example.org
    MDRequireHttps permanent
    MDRenewWindow 14d
    MDCertificateAgreement accepted
</MDomainSet>

<VirtualHost *:443>
    ServerName www.example.org
    SSLEngine on
</VirtualHost>
";

/// A scope setting used inside a virtual host, which is not allowed.
pub const VHOST_OVERRIDE: &str = "\
<VirtualHost *:443>
    ServerName www.example.org
    MDMustStaple on
</VirtualHost>
";
