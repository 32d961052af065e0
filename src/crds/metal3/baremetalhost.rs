//! `metal3.io/v1alpha1` BareMetalHost

use crate::crds::{typed_round_trip, CrdKind};
use k8s_openapi::api::core::v1::{ObjectReference, SecretReference};
use provider_schema::{Attribute, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BOOT_MODES: [&str; 3] = ["UEFI", "UEFISecureBoot", "legacy"];

pub const RAID_LEVELS: [&str; 6] = ["0", "1", "2", "5", "6", "1+0"];

pub const SOFTWARE_RAID_LEVELS: [&str; 3] = ["0", "1", "1+0"];

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomatedCleaningMode {
    Metadata,
    Disabled,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BootMode {
    #[serde(rename = "UEFI")]
    Uefi,
    #[serde(rename = "UEFISecureBoot")]
    UefiSecureBoot,
    #[serde(rename = "legacy")]
    Legacy,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumType {
    Md5,
    Sha256,
    Sha512,
    Auto,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageFormat {
    Raw,
    Qcow2,
    Vdi,
    Vmdk,
    LiveIso,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

/// Connection details of the baseboard management controller
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BmcDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_certificate_verification: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDeploy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simultaneous_multithreading_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sriov_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtualization_enabled: Option<bool>,
}

/// Image to provision onto the host
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_type: Option<ChecksumType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootDeviceHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hctl: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size_gigabytes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotational: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wwn: Option<String>,

    #[serde(default, rename = "wwnNGUID", skip_serializing_if = "Option::is_none")]
    pub wwn_nguid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wwn_vendor_extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wwn_with_extension: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareRaidVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_physical_disks: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_disks: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotational: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_gibibytes: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareRaidVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_disks: Option<Vec<RootDeviceHints>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_gibibytes: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RaidConfig {
    #[serde(
        default,
        rename = "hardwareRAIDVolumes",
        skip_serializing_if = "Option::is_none"
    )]
    pub hardware_raid_volumes: Option<Vec<HardwareRaidVolume>>,

    #[serde(
        default,
        rename = "softwareRAIDVolumes",
        skip_serializing_if = "Option::is_none"
    )]
    pub software_raid_volumes: Option<Vec<SoftwareRaidVolume>>,
}

/// Node taint; `timeAdded` is kept as the raw RFC 3339 text
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTaint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<TaintEffect>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_added: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automated_cleaning_mode: Option<AutomatedCleaningMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmc: Option<BmcDetails>,

    #[serde(default, rename = "bootMACAddress", skip_serializing_if = "Option::is_none")]
    pub boot_mac_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_mode: Option<BootMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_ref: Option<ObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_deploy: Option<CustomDeploy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externally_provisioned: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<FirmwareConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<HostImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<SecretReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_data: Option<SecretReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprovisioning_network_data_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid: Option<RaidConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_device_hints: Option<RootDeviceHints>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taints: Option<Vec<HostTaint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<SecretReference>,
}

fn secret_reference_attribute(json_name: &str, description: &str) -> Attribute {
    Attribute::object(
        json_name,
        vec![
            Attribute::string("name").description("Name is unique within a namespace to reference a secret resource."),
            Attribute::string("namespace").description("Namespace defines the space within which the secret name must be unique."),
        ],
    )
    .description(description)
}

fn root_device_hints_attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("deviceName")
            .description("A Linux device name like \"/dev/vda\", or a by-path link to it like \"/dev/disk/by-path/pci-0000:01:00.0-scsi-0:2:0:0\"."),
        Attribute::string("hctl")
            .description("A SCSI bus address like 0:0:0:0."),
        Attribute::int64("minSizeGigabytes")
            .description("The minimum size of the device in Gigabytes.")
            .validator(Validator::Int64AtLeast(0)),
        Attribute::string("model")
            .description("A vendor-specific device identifier. The hint can be a substring of the actual value."),
        Attribute::bool("rotational")
            .description("True if the device should use spinning media, false otherwise."),
        Attribute::string("serialNumber")
            .description("Device serial number. The value must match exactly."),
        Attribute::string("vendor")
            .description("The name of the vendor or manufacturer of the device. The hint can be a substring of the actual value."),
        Attribute::string("wwn")
            .description("Unique storage identifier. The hint must match the actual value exactly."),
        Attribute::string("wwnNGUID")
            .description("Unique storage identifier for NVMe devices. The hint must match the actual value exactly."),
        Attribute::string("wwnVendorExtension")
            .description("Unique vendor storage identifier. The hint must match the actual value exactly."),
        Attribute::string("wwnWithExtension")
            .description("Unique storage identifier with the vendor extension appended. The hint must match the actual value exactly."),
    ]
}

fn raid_attribute() -> Attribute {
    Attribute::object(
        "raid",
        vec![
            Attribute::list_of_objects(
                "hardwareRAIDVolumes",
                vec![
                    Attribute::string("controller")
                        .description("The name of the RAID controller to use."),
                    Attribute::string("level")
                        .required()
                        .description("RAID level for the logical disk.")
                        .validator(Validator::one_of(RAID_LEVELS)),
                    Attribute::string("name")
                        .description("Name of the volume. Should be unique within the Node."),
                    Attribute::int64("numberOfPhysicalDisks")
                        .description("Integer, number of physical disks to use for the logical disk.")
                        .validator(Validator::Int64AtLeast(1)),
                    Attribute::string_list("physicalDisks")
                        .description("Optional list of physical disk names to be used for the hardware RAID volumes."),
                    Attribute::bool("rotational")
                        .description("Select disks with only rotational or solid-state storage."),
                    Attribute::int64("sizeGibibytes")
                        .description("Size of the logical disk to be created in GiB. If unspecified or set be 0, the maximum capacity of disk will be used for logical disk.")
                        .validator(Validator::Int64AtLeast(0)),
                ],
            )
            .description("The list of logical disks for hardware RAID, if rootDeviceHints isn't used, first volume is root volume."),
            Attribute::list_of_objects(
                "softwareRAIDVolumes",
                vec![
                    Attribute::string("level")
                        .required()
                        .description("RAID level for the logical disk.")
                        .validator(Validator::one_of(SOFTWARE_RAID_LEVELS)),
                    Attribute::list_of_objects("physicalDisks", root_device_hints_attributes())
                        .description("A list of device hints, the number of items should be greater than or equal to 2.")
                        .validator(Validator::ListSizeAtLeast(2)),
                    Attribute::int64("sizeGibibytes")
                        .description("Size of the logical disk to be created in GiB.")
                        .validator(Validator::Int64AtLeast(0)),
                ],
            )
            .description("The list of logical disks for software RAID, if rootDeviceHints isn't used, first volume is root volume.")
            .validator(Validator::ListSizeAtMost(2)),
        ],
    )
    .description("RAID configuration for bare metal server.")
}

fn taints_attribute() -> Attribute {
    Attribute::list_of_objects(
        "taints",
        vec![
            Attribute::string("effect")
                .required()
                .description("The effect of the taint on pods that do not tolerate the taint.")
                .validator(Validator::one_of(["NoSchedule", "PreferNoSchedule", "NoExecute"])),
            Attribute::string("key")
                .required()
                .description("The taint key to be applied to a node."),
            Attribute::string("timeAdded")
                .description("TimeAdded represents the time at which the taint was added. It is only written for NoExecute taints."),
            Attribute::string("value")
                .description("The taint value corresponding to the taint key."),
        ],
    )
    .description("Taints is the full, authoritative list of taints to apply to the corresponding Machine.")
}

fn consumer_ref_attribute() -> Attribute {
    Attribute::object(
        "consumerRef",
        vec![
            Attribute::string("apiVersion").description("API version of the referent."),
            Attribute::string("fieldPath").description("If referring to a piece of an object instead of an entire object, this string should contain a valid JSON/Go field access statement."),
            Attribute::string("kind").description("Kind of the referent."),
            Attribute::string("name").description("Name of the referent."),
            Attribute::string("namespace").description("Namespace of the referent."),
            Attribute::string("resourceVersion").description("Specific resourceVersion to which this reference is made, if any."),
            Attribute::string("uid").description("UID of the referent."),
        ],
    )
    .description("ConsumerRef can be used to store information about something that is using a host. When it is not empty, the host is considered \"in use\".")
}

/// The BareMetalHost kind
pub struct BareMetalHostKind;

impl CrdKind for BareMetalHostKind {
    fn group(&self) -> &str {
        "metal3.io"
    }

    fn version(&self) -> &str {
        "v1alpha1"
    }

    fn kind(&self) -> &str {
        "BareMetalHost"
    }

    fn plural(&self) -> &str {
        "baremetalhosts"
    }

    fn description(&self) -> &str {
        "BareMetalHost is the Schema for the baremetalhosts API"
    }

    fn spec_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::string("architecture")
                .description("CPU architecture of the host, e.g. \"x86_64\" or \"aarch64\". If unset, eventually populated by inspection."),
            Attribute::string("automatedCleaningMode")
                .description("When set to disabled, automated cleaning will be skipped during provisioning and deprovisioning.")
                .validator(Validator::one_of(["metadata", "disabled"])),
            Attribute::object(
                "bmc",
                vec![
                    Attribute::string("address")
                        .required()
                        .description("Address holds the URL for accessing the controller on the network. The scheme part designates the driver to use with the host."),
                    Attribute::string("credentialsName")
                        .required()
                        .description("The name of the secret containing the BMC credentials (requires keys \"username\" and \"password\")."),
                    Attribute::bool("disableCertificateVerification")
                        .description("DisableCertificateVerification disables verification of server certificates when using HTTPS to connect to the BMC."),
                ],
            )
            .description("How do we connect to the BMC (Baseboard Management Controller) on the host?"),
            Attribute::string("bootMACAddress")
                .description("The MAC address of the NIC used for provisioning the host. In case of network boot, this is the MAC address of the PXE booting interface.")
                .validator(Validator::StringRegex("^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$".to_string())),
            Attribute::string("bootMode")
                .description("Select the method of initializing the hardware during boot. Defaults to UEFI.")
                .validator(Validator::one_of(BOOT_MODES)),
            consumer_ref_attribute(),
            Attribute::object(
                "customDeploy",
                vec![Attribute::string("method")
                    .required()
                    .description("Custom deploy method name. This name is specific to the deploy ramdisk used.")],
            )
            .description("A custom deploy procedure."),
            Attribute::string("description")
                .description("Description is a human-entered text used to help identify the host."),
            Attribute::bool("externallyProvisioned")
                .description("ExternallyProvisioned means something else has provisioned the image running on the host, and the operator should only manage the power status."),
            Attribute::object(
                "firmware",
                vec![
                    Attribute::bool("simultaneousMultithreadingEnabled")
                        .description("Allows a single physical processor core to appear as several logical processors."),
                    Attribute::bool("sriovEnabled")
                        .description("SR-IOV support enables a hypervisor to create virtual instances of a PCI-express device."),
                    Attribute::bool("virtualizationEnabled")
                        .description("Supports the virtualization of platform hardware."),
                ],
            )
            .description("Firmware (BIOS) configuration for bare metal server. If set, the requested settings will be applied before the host is provisioned."),
            Attribute::string("hardwareProfile")
                .description("What is the name of the hardware profile for this host?"),
            Attribute::object(
                "image",
                vec![
                    Attribute::string("checksum")
                        .description("Checksum is the checksum for the image. Required for all formats except for \"live-iso\"."),
                    Attribute::string("checksumType")
                        .description("ChecksumType is the checksum algorithm for the image, e.g md5, sha256 or sha512.")
                        .validator(Validator::one_of(["md5", "sha256", "sha512", "auto"])),
                    Attribute::string("format")
                        .description("Format contains the format of the image (raw, qcow2, ...).")
                        .validator(Validator::one_of(["raw", "qcow2", "vdi", "vmdk", "live-iso"])),
                    Attribute::string("url")
                        .required()
                        .description("URL is a location of an image to deploy."),
                ],
            )
            .description("Image holds the details of the image to be provisioned."),
            secret_reference_attribute("metaData", "MetaData holds the reference to the Secret containing host metadata which is passed to the Config Drive."),
            secret_reference_attribute("networkData", "NetworkData holds the reference to the Secret containing network configuration which is passed to the Config Drive and interpreted by the first boot software such as cloud-init."),
            Attribute::bool("online")
                .required()
                .description("Should the host be powered on? Changing this value will trigger a change in power state of the host."),
            Attribute::string("preprovisioningNetworkDataName")
                .description("PreprovisioningNetworkDataName is the name of the Secret in the local namespace containing network configuration which is passed to the preprovisioning image, and to the Config Drive if not overridden by specifying NetworkData."),
            raid_attribute(),
            Attribute::object("rootDeviceHints", root_device_hints_attributes())
                .description("Provide guidance about how to choose the device for the image being provisioned."),
            taints_attribute(),
            secret_reference_attribute("userData", "UserData holds the reference to the Secret containing the user data which is passed to the Config Drive and interpreted by the first-boot software such as cloud-init."),
        ]
    }

    fn canonical_spec(&self, spec: Value) -> Result<Value, serde_json::Error> {
        typed_round_trip::<BareMetalHostSpec>(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_schema::Schema;
    use serde_json::json;

    fn full_spec() -> Value {
        json!({
            "architecture": "x86_64",
            "automatedCleaningMode": "metadata",
            "bmc": {
                "address": "redfish-virtualmedia://10.0.0.5/redfish/v1/Systems/1",
                "credentialsName": "node-0-bmc-secret",
                "disableCertificateVerification": true
            },
            "bootMACAddress": "00:5c:52:31:3a:9c",
            "bootMode": "UEFISecureBoot",
            "consumerRef": {
                "apiVersion": "infrastructure.cluster.x-k8s.io/v1beta1",
                "kind": "Metal3Machine",
                "name": "worker-0",
                "namespace": "metal3"
            },
            "description": "rack 4, slot 2",
            "firmware": {"sriovEnabled": true},
            "image": {
                "checksum": "http://images/ubuntu.img.sha256sum",
                "checksumType": "sha256",
                "format": "live-iso",
                "url": "http://images/ubuntu.img"
            },
            "metaData": {"name": "node-0-meta", "namespace": "metal3"},
            "online": true,
            "raid": {
                "hardwareRAIDVolumes": [{"level": "1+0", "numberOfPhysicalDisks": 4, "sizeGibibytes": 500}],
                "softwareRAIDVolumes": [{"level": "1", "physicalDisks": [{"deviceName": "/dev/sda"}, {"wwnNGUID": "eui.0025"}]}]
            },
            "rootDeviceHints": {"minSizeGigabytes": 200, "wwnNGUID": "eui.0026"},
            "taints": [{"effect": "NoSchedule", "key": "dedicated", "value": "storage"}],
            "userData": {"name": "node-0-user-data"}
        })
    }

    #[test]
    fn test_typed_round_trip_keeps_every_field() {
        let spec = full_spec();
        assert_eq!(BareMetalHostKind.canonical_spec(spec.clone()).unwrap(), spec);
    }

    #[test]
    fn test_yaml_round_trip() {
        let typed: BareMetalHostSpec = serde_json::from_value(full_spec()).unwrap();
        let yaml = serde_yaml::to_string(&typed).unwrap();
        assert!(yaml.contains("bootMACAddress:"));
        assert!(yaml.contains("hardwareRAIDVolumes:"));

        let parsed: BareMetalHostSpec = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, typed);
    }

    #[test]
    fn test_attribute_names_for_acronyms() {
        let schema = Schema::new("bmh").with_attributes(BareMetalHostKind.spec_attributes());
        assert!(schema.validate_implementation().is_empty());
        assert!(schema.attribute("boot_mac_address").is_some());

        let raid = schema.attribute("raid").unwrap();
        let nested = raid.attribute_type.nested().unwrap();
        assert_eq!(nested[0].name, "hardware_raid_volumes");
        assert_eq!(nested[1].name, "software_raid_volumes");
    }

    #[test]
    fn test_config_translates_to_typed_shape() {
        let schema = Schema::new("bmh").with_attributes(BareMetalHostKind.spec_attributes());
        let config = json!({
            "online": false,
            "boot_mac_address": "00:5c:52:31:3a:9c",
            "bmc": {"address": "ipmi://10.0.0.5", "credentials_name": "secret"},
            "root_device_hints": {"wwn_nguid": "eui.1"},
        });

        assert!(schema.validate_config(&config).is_empty());
        let kubernetes = schema.to_kubernetes(&config);
        assert_eq!(kubernetes["bootMACAddress"], "00:5c:52:31:3a:9c");
        assert_eq!(kubernetes["rootDeviceHints"]["wwnNGUID"], "eui.1");
        assert_eq!(
            BareMetalHostKind.canonical_spec(kubernetes.clone()).unwrap(),
            kubernetes
        );
    }

    #[test]
    fn test_invalid_boot_mode_is_rejected() {
        let schema = Schema::new("bmh").with_attributes(BareMetalHostKind.spec_attributes());
        let diagnostics = schema.validate_config(&json!({"online": true, "boot_mode": "BIOS"}));
        assert!(diagnostics.has_error());
        assert!(BareMetalHostKind
            .canonical_spec(json!({"bootMode": "BIOS"}))
            .is_err());
    }
}
