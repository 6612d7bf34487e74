//! Playbook and ansible.cfg templates.

use std::path::{Path, PathBuf};

use crate::error::StageError;

pub const ANSIBLE_CFG: &str = "\
[defaults]
connection = paramiko
host_key_checking = False
timeout = 60
deprecation_warnings = False
interpreter_python = auto_silent
[persistent_connection]
command_timeout = 60
connect_timeout = 60
";

pub const LOOPBACK_IOL: &str = r#"---
- name: Configure Loopback Interfaces on IOL Devices
  hosts: cisco_iol
  gather_facts: false
  connection: network_cli
  tasks:
    - name: Get device number
      set_fact:
        device_number: "{{ inventory_hostname.split('-')[-1][1:] }}"
        device_type: "{{ inventory_hostname.split('-')[-1][0] }}"
      no_log: true

    - name: Configure Router Loopbacks
      ios_command:
        commands:
          - configure terminal
          - interface Loopback0
          - ip address 1.1.{{ device_number }}.1 255.255.255.255
          - no shutdown
          - interface Loopback10
          - ip address 172.16.{{ device_number }}.1 255.255.255.0
          - no shutdown
          - end
      when: device_type == 'r'

    - name: Configure Switch Loopbacks
      ios_command:
        commands:
          - configure terminal
          - interface Loopback0
          - ip address 2.2.{{ device_number }}.1 255.255.255.255
          - no shutdown
          - interface Loopback10
          - ip address 172.17.{{ device_number }}.1 255.255.255.0
          - no shutdown
          - end
      when: device_type == 's'

    - name: Display Configuration Summary
      debug:
        msg: "{{ inventory_hostname.split('-')[-1] }} Loopback Configuration:
              \n- Loopback0: {{ '1.1.' if device_type == 'r' else '2.2.' }}{{ device_number }}.1/32
              \n- Loopback10: {{ '172.16.' if device_type == 'r' else '172.17.' }}{{ device_number }}.1/24"
"#;

pub const LOOPBACK_VIOS: &str = r#"---
- name: Configure Loopback Interfaces on VIOS Devices
  hosts: cisco_vios
  gather_facts: false
  connection: network_cli
  tasks:
    - name: Get device number
      set_fact:
        device_number: "{{ inventory_hostname.split('-')[-1][2:] }}"
        device_type: "{{ inventory_hostname.split('-')[-1][0:2] }}"
      no_log: true

    - name: Configure Router Loopbacks
      ios_command:
        commands:
          - configure terminal
          - interface Loopback0
          - ip address 3.3.{{ device_number }}.1 255.255.255.255
          - no shutdown
          - interface Loopback10
          - ip address 172.18.{{ device_number }}.1 255.255.255.0
          - no shutdown
          - end
      when: device_type == 'vr'

    - name: Configure Switch Loopbacks
      ios_command:
        commands:
          - configure terminal
          - interface Loopback0
          - ip address 4.4.{{ device_number }}.1 255.255.255.255
          - no shutdown
          - interface Loopback10
          - ip address 172.19.{{ device_number }}.1 255.255.255.0
          - no shutdown
          - end
      when: device_type == 'vs'

    - name: Display Configuration Summary
      debug:
        msg: "{{ inventory_hostname.split('-')[-1] }} Loopback Configuration:
              \n- Loopback0: {{ '3.3.' if device_type == 'vr' else '4.4.' }}{{ device_number }}.1/32
              \n- Loopback10: {{ '172.18.' if device_type == 'vr' else '172.19.' }}{{ device_number }}.1/24"
"#;

pub const INTERFACE_IP_IOL: &str = r#"---
- name: Configure Interface IPs and Status on IOL Devices
  hosts: cisco_iol
  gather_facts: false
  connection: network_cli
  tasks:
    - name: Get device name
      set_fact:
        device_name: "{{ inventory_hostname.split('-')[-1] }}"
        is_router: "{{ inventory_hostname.split('-')[-1].startswith('r') }}"
      no_log: true

    - name: Enable all interfaces on switches
      ios_command:
        commands:
          - configure terminal
          - interface {{ item }}
          - no shutdown
          - end
      loop:
        - Ethernet0/0
        - Ethernet0/1
        - Ethernet0/2
        - Ethernet0/3
        - Ethernet1/0
        - Ethernet1/1
        - Ethernet1/2
        - Ethernet1/3
      when: not is_router

    - name: Configure router interfaces
      ios_command:
        commands:
          - configure terminal
          - interface {{ item.name }}
          - ip address {{ item.ip | regex_replace('/30', ' 255.255.255.252') | regex_replace('/28', ' 255.255.255.240') }}
          - no shutdown
          - end
      loop: "{{ interfaces }}"
      when: is_router and interfaces is defined

    - name: Show router interface status
      ios_command:
        commands:
          - show ip interface brief | exclude unassigned
      register: if_status
      when: is_router

    - name: Display interface summary
      debug:
        msg: |
          {{ device_name }} Interface Configuration:
          {% for line in if_status.stdout_lines[0] %}
          {{ line }}
          {% endfor %}
      when: is_router

    - name: Show switch interface status
      ios_command:
        commands:
          - show interfaces status | include connected
      register: if_status
      when: not is_router

    - name: Display interface summary
      debug:
        msg: |
          {{ device_name }} Interface Status:
          {% for line in if_status.stdout_lines[0] %}
          {{ line }}
          {% endfor %}
      when: not is_router
"#;

pub const INTERFACE_IP_VIOS: &str = r#"---
- name: Configure Interface IPs and Status on VIOS Devices
  hosts: cisco_vios
  gather_facts: false
  connection: network_cli
  tasks:
    - name: Get device name
      set_fact:
        device_name: "{{ inventory_hostname.split('-')[-1] }}"
        is_router: "{{ inventory_hostname.split('-')[-1].startswith('vr') }}"
      no_log: true

    - name: Enable all interfaces on switches
      ios_command:
        commands:
          - configure terminal
          - interface {{ item }}
          - no shutdown
          - end
      loop:
        - GigabitEthernet0/0
        - GigabitEthernet0/1
      when: not is_router

    - name: Configure router interfaces
      ios_command:
        commands:
          - configure terminal
          - interface GigabitEthernet0/{{ item.name | replace('eth', '') }}
          - ip address {{ item.ip | regex_replace('/30', ' 255.255.255.252') | regex_replace('/28', ' 255.255.255.240') }}
          - no shutdown
          - end
      loop: "{{ interfaces }}"
      when: is_router and interfaces is defined

    - name: Show router interface status
      ios_command:
        commands:
          - show ip interface brief | exclude unassigned
      register: if_status
      when: is_router

    - name: Display interface summary
      debug:
        msg: |
          {{ device_name }} Interface Configuration:
          {% for line in if_status.stdout_lines[0] %}
          {{ line }}
          {% endfor %}
      when: is_router

    - name: Show switch interface status
      ios_command:
        commands:
          - show interfaces status | include connected
      register: if_status
      when: not is_router

    - name: Display interface summary
      debug:
        msg: |
          {{ device_name }} Interface Status:
          {% for line in if_status.stdout_lines[0] %}
          {{ line }}
          {% endfor %}
      when: not is_router
"#;

pub const SAVE_CONFIG: &str = r#"---
- name: Save Running Config to Startup Config
  hosts: cisco_iol:cisco_vios
  gather_facts: false
  connection: network_cli
  tasks:
    - name: Save configuration
      cli_command:
        command: copy running-config startup-config
        prompt: 'Destination filename \[startup-config\]'
        answer: "\r"
      register: output
      ignore_errors: yes
    - name: Display save output
      debug:
        var: output.stdout_lines
      when: output is defined
"#;

/// Every file the batches need, as `(file name, content)`.
pub fn batch_files() -> [(&'static str, &'static str); 6] {
    [
        ("ansible.cfg", ANSIBLE_CFG),
        ("loopback_iol.yaml", LOOPBACK_IOL),
        ("loopback_vios.yaml", LOOPBACK_VIOS),
        ("interface_ip_iol.yaml", INTERFACE_IP_IOL),
        ("interface_ip_vios.yaml", INTERFACE_IP_VIOS),
        ("save_config.yaml", SAVE_CONFIG),
    ]
}

/// Write `ansible.cfg` and the playbooks into `dir`, overwriting old copies.
pub fn write_batch_files(dir: &Path) -> Result<Vec<PathBuf>, StageError> {
    batch_files()
        .iter()
        .map(|(name, content)| {
            let path = dir.join(name);
            std::fs::write(&path, content).map_err(|source| StageError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{Batch, DeviceGroup};
    use tempfile::TempDir;

    #[test]
    fn test_playbooks_are_valid_yaml() {
        for (name, content) in batch_files().iter().filter(|(name, _)| name.ends_with(".yaml")) {
            let parsed: Result<serde_yaml::Value, _> = serde_yaml::from_str(content);
            assert!(parsed.is_ok(), "{} does not parse: {:?}", name, parsed.err());
        }
    }

    #[test]
    fn test_every_batch_has_a_template() {
        let names: Vec<&str> = batch_files().iter().map(|(name, _)| *name).collect();
        for batch in Batch::ALL {
            for group in [DeviceGroup::Iol, DeviceGroup::Vios] {
                assert!(names.contains(&batch.playbook(group)));
            }
        }
    }

    #[test]
    fn test_save_playbook_answers_prompt() {
        let parsed: serde_yaml::Value = serde_yaml::from_str(SAVE_CONFIG).unwrap();
        let task = &parsed[0]["tasks"][0]["cli_command"];
        assert_eq!(task["command"].as_str(), Some("copy running-config startup-config"));
        assert_eq!(task["answer"].as_str(), Some("\r"));
        assert_eq!(parsed[0]["hosts"].as_str(), Some("cisco_iol:cisco_vios"));
    }

    #[test]
    fn test_write_batch_files() {
        let dir = TempDir::new().unwrap();
        let written = write_batch_files(dir.path()).unwrap();
        assert_eq!(written.len(), 6);

        let cfg = std::fs::read_to_string(dir.path().join("ansible.cfg")).unwrap();
        assert!(cfg.contains("host_key_checking = False"));
        assert!(cfg.contains("connect_timeout = 60"));
    }
}
