/// Capability descriptor printed for `--scheme`. The host reads it to learn
/// which parameters the input accepts.
pub const SCHEME: &str = r#"<scheme>
    <title>Prometheus</title>
    <description>Scrapes a Prometheus endpoint, either directly or via Prometheus federation</description>
    <use_external_validation>false</use_external_validation>
    <streaming_mode>simple</streaming_mode>
    <use_single_instance>false</use_single_instance>
    <endpoint>
        <args>
            <arg name="URI">
                <title>Metrics URI</title>
                <description>A Prometheus exporter endpoint</description>
                <required_on_edit>true</required_on_edit>
                <required_on_create>true</required_on_create>
            </arg>
            <arg name="match">
                <title>Match filter</title>
                <description>A comma-delimited list of Prometheus "match" expressions: only functional and required for /federate endpoints</description>
                <required_on_edit>false</required_on_edit>
                <required_on_create>false</required_on_create>
            </arg>
            <arg name="insecureSkipVerify">
                <title>Skip certificate verification</title>
                <description>If the endpoint is HTTPS, this setting controls whether to skip verification of the server certificate or not</description>
                <required_on_edit>false</required_on_edit>
                <required_on_create>false</required_on_create>
            </arg>
            <arg name="timeout">
                <title>Request timeout</title>
                <description>Seconds to wait for the whole scrape before giving up (default 30)</description>
                <required_on_edit>false</required_on_edit>
                <required_on_create>false</required_on_create>
            </arg>
        </args>
    </endpoint>
</scheme>"#;
