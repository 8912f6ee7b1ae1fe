//! Port-based service tagging, lifted from the teacher workspace's
//! `fingerprint::service_detector::detect_service_from_port` table. Only the
//! port number is consulted — no banner parsing, no version extraction; that
//! belongs to a richer fingerprinting layer this crate deliberately doesn't
//! grow into (spec §4.5 keeps C5's contract narrow).

/// Returns a short service tag for a well-known port, or `None`.
#[must_use]
pub fn service_type(port: u16) -> Option<&'static str> {
    Some(match port {
        20 => "ftp-data",
        21 => "ftp",
        990 => "ftps",
        22 => "ssh",
        23 => "telnet",
        25 => "smtp",
        465 => "smtps",
        587 => "submission",
        53 => "domain",
        80 => "http",
        443 => "https",
        8000 | 8888 | 9000 | 3000 | 5000 => "http-alt",
        8080 => "http-proxy",
        8443 => "https-alt",
        110 => "pop3",
        995 => "pop3s",
        143 => "imap",
        993 => "imaps",
        111 => "rpcbind",
        135 => "msrpc",
        139 => "netbios-ssn",
        445 => "microsoft-ds",
        3389 => "rdp",
        161 => "snmp",
        162 => "snmptrap",
        389 => "ldap",
        636 => "ldaps",
        123 => "ntp",
        119 => "nntp",
        179 => "bgp",
        88 => "kerberos",
        194 | 6667 => "irc",
        6697 => "ircs",
        9418 => "git",
        514 => "syslog",
        873 => "rsync",
        2049 => "nfs",
        1080 => "socks",
        3128 => "squid-http",
        1433 => "mssql",
        1521 => "oracle",
        3306 => "mysql",
        5432 => "postgresql",
        27017 => "mongodb",
        6379 => "redis",
        9200 => "elasticsearch",
        11211 => "memcached",
        5900 | 5901 | 5902 => "vnc",
        1723 => "pptp",
        1194 => "openvpn",
        500 => "isakmp",
        4500 => "ipsec-nat-t",
        2375 => "docker",
        2376 => "docker-tls",
        6443 => "kubernetes",
        10250 => "kubelet",
        5672 => "amqp",
        15672 => "rabbitmq",
        1883 => "mqtt",
        8883 => "mqtts",
        9090 => "prometheus",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ports_resolve() {
        assert_eq!(service_type(22), Some("ssh"));
        assert_eq!(service_type(443), Some("https"));
        assert_eq!(service_type(3306), Some("mysql"));
    }

    #[test]
    fn unknown_port_is_none() {
        assert_eq!(service_type(40404), None);
    }
}
